//! Domain core for the qanda question/answer board.
//!
//! Holds the entity descriptors, typed identifiers, the canonical error
//! type, the authorization predicates, and the repository traits the
//! storage and service layers implement and consume. This crate performs
//! no I/O.

mod answer;
mod authorize;
mod error;
mod ids;
mod like;
mod member;
mod pagination;
mod question;
mod traits;

pub use answer::{AnswerDescriptor, AnswerVisibility};
pub use authorize::{derive_roles, ensure_admin, ensure_owner_or_admin, Actor};
pub use error::{CoreError, CoreResult};
pub use ids::{AnswerId, LikeId, MemberId, QuestionId};
pub use like::{LikeDescriptor, ToggleOutcome};
pub use member::{MemberDescriptor, MemberStatus, Role};
pub use pagination::{Page, PageRequest, MAX_PAGE_SIZE};
pub use question::{
    QuestionDescriptor, QuestionStatus, SortKey, Visibility, DEFAULT_QUESTION_IMAGE,
    SECRET_TITLE_PLACEHOLDER,
};
pub use traits::{AnswerRepository, LikeRepository, MemberRepository, QuestionRepository};
