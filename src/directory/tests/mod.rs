mod provider;

use super::Directory;

pub fn run_all_tests(db: &Directory) {
    user::run_user_tests(db);
    provider::run_provider_tests(db);
}
