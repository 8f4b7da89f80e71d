use serde::{Deserialize, Serialize};

/// The fixed set of special-use folders every account gets, with their
/// RFC 6154 attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialUse {
    Sent,
    Trash,
    Junk,
    Drafts,
    Archive,
}

impl SpecialUse {
    pub const ALL: [SpecialUse; 5] = [
        SpecialUse::Sent,
        SpecialUse::Trash,
        SpecialUse::Junk,
        SpecialUse::Drafts,
        SpecialUse::Archive,
    ];

    pub fn folder_name(&self) -> &'static str {
        match self {
            SpecialUse::Sent => "Sent",
            SpecialUse::Trash => "Trash",
            SpecialUse::Junk => "Junk",
            SpecialUse::Drafts => "Drafts",
            SpecialUse::Archive => "Archive",
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            SpecialUse::Sent => "\\Sent",
            SpecialUse::Trash => "\\Trash",
            SpecialUse::Junk => "\\Junk",
            SpecialUse::Drafts => "\\Drafts",
            SpecialUse::Archive => "\\Archive",
        }
    }
}

/// Result of one folder creation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderOutcome {
    pub name: String,
    /// Whether the created folder carries its special-use tag.
    pub special_use: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated outcome of provisioning one account. Folder failures are
/// recorded here instead of failing the call; the caller decides
/// whether to warn or proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub username: String,
    pub special_use_supported: bool,
    pub folders: Vec<FolderOutcome>,
}

impl ProvisionReport {
    pub fn created(&self) -> usize {
        self.folders.iter().filter(|f| f.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.folders.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn tagged(&self) -> usize {
        self.folders
            .iter()
            .filter(|f| f.error.is_none() && f.special_use)
            .count()
    }

    pub fn is_partial(&self) -> bool {
        self.failed() > 0
    }
}
