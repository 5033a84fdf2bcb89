//! Remote resource types managed by bucket-notify

use std::fmt;

/// Types of remote resources touched by bucket-notify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// S3 bucket
    Bucket,
    /// Object inside a bucket
    Object,
    /// Lambda function
    Function,
}

impl ResourceKind {
    /// Get a short string representation for logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Object => "object",
            ResourceKind::Function => "function",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
