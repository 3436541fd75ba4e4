use log::{info, warn};

use crate::types::record::ConfigBlock;
use crate::types::response::{HomeDirectory, SessionDescriptor};

/// Which record a merged field was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    User,
    Provider,
}

/// Merges the session fields of a user record and its identity provider
/// record. For every field the user value wins when present, then the
/// provider value, otherwise the field stays empty. `HomeDirectory` and
/// `HomeDirectoryDetails` form one field: whichever source defines either
/// of them supplies the home directory as a whole.
pub fn merge_config(user: &ConfigBlock, provider: &ConfigBlock) -> SessionDescriptor {
    let role = pick("Role", &user.role, &provider.role);
    if role.is_none() {
        warn!("Role not found in user record or identity provider record");
    }

    SessionDescriptor {
        role,
        policy: pick("Policy", &user.policy, &provider.policy),
        home: pick_home(user, provider),
        posix_profile: pick("PosixProfile", &user.posix_profile, &provider.posix_profile),
    }
}

fn pick<T: Clone>(field: &str, user: &Option<T>, provider: &Option<T>) -> Option<T> {
    let (value, source) = match (user, provider) {
        (Some(value), _) => (value, Source::User),
        (None, Some(value)) => (value, Source::Provider),
        (None, None) => return None,
    };
    info!("Using {field} value from {}", source.describe());
    Some(value.clone())
}

fn pick_home(user: &ConfigBlock, provider: &ConfigBlock) -> Option<HomeDirectory> {
    for (block, source) in [(user, Source::User), (provider, Source::Provider)] {
        if let Some(ref details) = block.home_directory_details {
            info!("HomeDirectoryDetails found in {}", source.describe());
            return Some(HomeDirectory::Logical(details.clone()));
        }
        if let Some(ref path) = block.home_directory {
            info!("HomeDirectory found in {}", source.describe());
            return Some(HomeDirectory::Path(path.clone()));
        }
    }
    None
}

impl Source {
    fn describe(self) -> &'static str {
        match self {
            Source::User => "user record",
            Source::Provider => "identity provider record",
        }
    }
}
