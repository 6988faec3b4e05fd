//! Property-based tests for identity derivation and storage naming.
//!
//! These tests use proptest to generate random natural keys and verify
//! that the index's identity function and the summary file-naming scheme
//! hold their invariants for all inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::index::module_id;
    use crate::summary::{repo_base_name, ModuleSummary};
    use proptest::prelude::*;

    fn summary(repository: &str, revision: &str, path: &str) -> ModuleSummary {
        ModuleSummary {
            repository: repository.to_string(),
            revision: revision.to_string(),
            path: path.to_string(),
            description: None,
            variables: vec![],
            outputs: vec![],
            providers: vec![],
            submodules: vec![],
            resources: vec![],
            readme: None,
        }
    }

    proptest! {
        /// Property: module_id is deterministic (same triple = same digest)
        #[test]
        fn module_id_is_deterministic(
            repository in ".*",
            revision in ".*",
            path in ".*",
        ) {
            prop_assert_eq!(
                module_id(&repository, &revision, &path),
                module_id(&repository, &revision, &path)
            );
        }

        /// Property: module_id is always a 64-character lowercase hex digest
        #[test]
        fn module_id_is_hex_digest(
            repository in ".*",
            revision in ".*",
            path in ".*",
        ) {
            let id = module_id(&repository, &revision, &path);
            prop_assert_eq!(id.len(), 64);
            prop_assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        /// Property: changing the revision changes the digest
        #[test]
        fn module_id_distinguishes_revisions(
            repository in "[a-z]{1,20}",
            revision_a in "[a-z0-9.]{1,10}",
            revision_b in "[a-z0-9.]{1,10}",
        ) {
            prop_assume!(revision_a != revision_b);
            prop_assert_ne!(
                module_id(&repository, &revision_a, "."),
                module_id(&repository, &revision_b, ".")
            );
        }

        /// Property: storage file names contain no path separators and
        /// always end in .json
        #[test]
        fn storage_file_name_is_filesystem_safe(
            repo in "[a-zA-Z0-9._-]{1,30}",
            revision in "[a-zA-Z0-9._/-]{1,20}",
            path in "[a-zA-Z0-9._/-]{1,30}",
        ) {
            let url = format!("https://example.com/org/{}.git", repo);
            let name = summary(&url, &revision, &path).storage_file_name();
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
            prop_assert!(name.ends_with(".json"));
        }

        /// Property: repo_base_name never keeps a trailing .git and never
        /// contains a slash
        #[test]
        fn repo_base_name_strips_git_suffix(
            org in "[a-z]{1,10}",
            repo in "[a-z][a-z0-9-]{0,20}",
        ) {
            let base = repo_base_name(&format!("https://example.com/{}/{}.git", org, repo));
            prop_assert_eq!(&base, &repo);
            prop_assert!(!base.contains('/'));
        }
    }
}
