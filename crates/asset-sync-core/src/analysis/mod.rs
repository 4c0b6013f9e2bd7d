pub mod matcher;
pub mod urls;

pub use matcher::{match_catalog, MatchOutcome, MatchReport, MatchResult};
pub use urls::{audit_image_urls, normalize_image_url, write_audit, UrlAudit, UrlChange};
