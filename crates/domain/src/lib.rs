mod clock;
mod error;
pub mod lynx;
pub mod mobiledoc;
mod models;
pub mod notify;
mod patch;
pub mod posts;
pub mod records;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::PipelineError;
pub use models::{Author, MemberWebhook, PartialSnapshot, PostEvent, PostSnapshot, PostWebhook, Tag};
pub use patch::MetadataPatch;

/// 需要 Lynx 链接预览的文章分类
pub const ROUNDUP_TAG: &str = "roundup";
