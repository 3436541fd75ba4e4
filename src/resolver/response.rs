use anyhow::{Context, Result};

use crate::types::record::HomeDirectoryDetails;
use crate::types::response::{AuthResponse, HomeDirectory, SessionDescriptor};

/// Converts a session descriptor into the wire response. The runtime wants
/// `HomeDirectoryDetails` as a JSON string, structured mappings are
/// serialized here; everything else passes through.
pub fn build_response(desc: SessionDescriptor) -> Result<AuthResponse> {
    let home_directory_type = desc.home_directory_type();
    let (home_directory, home_directory_details) = match desc.home {
        Some(HomeDirectory::Path(path)) => (Some(path), None),
        Some(HomeDirectory::Logical(HomeDirectoryDetails::Entries(entries))) => {
            let s = serde_json::to_string(&entries).context("encode HomeDirectoryDetails")?;
            (None, Some(s))
        }
        Some(HomeDirectory::Logical(HomeDirectoryDetails::Raw(s))) => (None, Some(s)),
        None => (None, None),
    };

    Ok(AuthResponse {
        role: desc.role,
        policy: desc.policy,
        home_directory,
        home_directory_details,
        home_directory_type,
        posix_profile: desc.posix_profile,
    })
}
