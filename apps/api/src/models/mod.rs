pub mod job;
pub mod plan;
pub mod source;
pub mod template;

pub use job::{Job, JobReport, JobStatus};
pub use plan::{Issue, Plan, SlideHealth, SlideMapping};
pub use source::{PageSignature, Source, SourcePage, SourceType};
pub use template::{Layout, Template, ThemeMeta};
