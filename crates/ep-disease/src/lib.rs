//! `ep-disease` — what happens to one exposed agent, and how often it reaches
//! out to others.
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`state`]       | `DiseaseState`, `AgeCohort`, `ContactType`                |
//! | [`model`]       | `Disease` trait (the extension point) and `SwineFlu`      |
//! | [`timeline`]    | `DiseaseTimeline`: the 2–3 progress steps of one exposure |
//! | [`stream`]      | `BehaviorStream` implementations and `BehaviorStreams`    |
//!
//! Everything here is stateless apart from the caller-supplied `PlaceRng`, so
//! a `Disease` and a `BehaviorStreams` bundle can be shared by every shard.

pub mod model;
pub mod state;
pub mod stream;
pub mod timeline;


pub use model::{Disease, SwineFlu};
pub use state::{AgeCohort, ContactType, DiseaseState};
pub use stream::{
    BehaviorStream, BehaviorStreams, ContactStream, NonhomogeneousPoissonStream, PoissonStream,
};
pub use timeline::{DiseaseTimeline, ProgressStep};
