//! Moving redirect files next to their targets.

use itertools::Itertools;

use crate::backlinks::{LinkFinder, LinkHit};
use crate::config::Settings;
use crate::error::{RedirectorError, Result};
use crate::host::{Host, MetadataIndex};
use crate::paths::concat_dir_and_file_name;
use crate::redirect::{single_link_target, RedirectSet};
use crate::report::report_path;
use crate::rewrite::{rewrite_links, MisleadingLinkAndRealTarget};
use crate::text::{LineSplitter, SplitCache};
use crate::vault::{Link, VaultFile};

/// Moves redirect files for one command invocation.
///
/// With `update_links_on_move`, links that pointed at a moved file and stop
/// resolving to it are rewritten to its new location.
pub struct Mover<'a, H: Host> {
    finder: &'a dyn LinkFinder<H>,
    cache: SplitCache,
    update_links: bool,
    report_path: String,
}

impl<'a, H: Host> Mover<'a, H> {
    pub fn new(settings: &Settings, finder: &'a dyn LinkFinder<H>) -> Result<Mover<'a, H>> {
        Ok(Mover {
            finder,
            cache: SplitCache::new(LineSplitter::from_settings(settings)),
            update_links: settings.update_links_on_move,
            report_path: report_path(settings)?,
        })
    }

    /// Moves `file` into its target's folder when it has exactly one link,
    /// the link resolves and the target lives elsewhere. Returns whether the
    /// file was moved.
    pub fn move_if_necessary(&mut self, host: &mut H, file: &VaultFile) -> Result<bool> {
        let Some(target) = single_link_target(&*host, file) else {
            tracing::debug!("{} has no single resolvable link, not moved", file.path);
            return Ok(false);
        };
        if target.parent() == file.parent() {
            return Ok(false);
        }

        let new_path = concat_dir_and_file_name(target.parent(), &file.name)?;
        let (backlinks, outbound) = match self.update_links {
            true => (
                self.finder.links_into(host, std::slice::from_ref(file)),
                resolved_links(&*host, file),
            ),
            false => (vec![], vec![]),
        };

        let moved = match host.rename(&file.path, &new_path) {
            Ok(moved) => moved,
            Err(RedirectorError::FileExists(occupied)) => {
                tracing::warn!("can NOT move {}, {} already exists", file.path, occupied);
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        tracing::info!("moved {} to {}", file.path, moved.path);

        let relinked = self.relink(host, file, &moved, backlinks)?;
        if relinked > 0 {
            tracing::info!("updated links to {} in {} files", moved.path, relinked);
        }
        let rebased = self.rebase_own_links(host, file, &moved, outbound)?;
        if rebased > 0 {
            tracing::info!("updated {} links inside {}", rebased, moved.path);
        }

        Ok(true)
    }

    /// Returns the number of files whose links were rewritten.
    fn relink(
        &mut self,
        host: &mut H,
        old: &VaultFile,
        moved: &VaultFile,
        backlinks: Vec<LinkHit>,
    ) -> Result<usize> {
        let stale = backlinks
            .into_iter()
            .filter(|hit| hit.source.path != old.path && hit.source.path != self.report_path)
            .filter(|hit| {
                host.resolve_link(&hit.link.raw_target, &hit.source.path)
                    .map_or(true, |now| now.path != moved.path)
            })
            .collect_vec();

        let mut files_changed = 0;
        for (source, hits) in &stale.into_iter().chunk_by(|hit| hit.source.clone()) {
            let pairs = hits
                .map(|hit| {
                    let target = moved.clone();
                    MisleadingLinkAndRealTarget::new(&*host, source.clone(), hit.link, target)
                })
                .collect_vec();
            if rewrite_links(host, &mut self.cache, &source, pairs)? > 0 {
                files_changed += 1;
            }
        }

        Ok(files_changed)
    }

    /// Rewrites the links of `moved` that resolved before the move and now
    /// miss their old destination. Returns the number of rewritten links.
    fn rebase_own_links(
        &mut self,
        host: &mut H,
        old: &VaultFile,
        moved: &VaultFile,
        outbound: Vec<(Link, VaultFile)>,
    ) -> Result<usize> {
        let pairs = outbound
            .into_iter()
            .map(|(link, target)| match target.path == old.path {
                true => (link, moved.clone()),
                false => (link, target),
            })
            .filter(|(link, target)| {
                host.resolve_link(&link.raw_target, &moved.path)
                    .map_or(true, |now| now.path != target.path)
            })
            .map(|(link, target)| {
                MisleadingLinkAndRealTarget::new(&*host, moved.clone(), link, target)
            })
            .collect_vec();
        if pairs.is_empty() {
            return Ok(0);
        }

        rewrite_links(host, &mut self.cache, moved, pairs)
    }

    /// Moves every redirect file that needs it. Returns the number moved.
    pub fn move_redirect_files(&mut self, host: &mut H, redirects: &RedirectSet) -> Result<usize> {
        let mut count = 0;
        for file in redirects.files() {
            if self.move_if_necessary(host, file)? {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Links of `file` paired with the file each one resolves to.
fn resolved_links<M: MetadataIndex>(index: &M, file: &VaultFile) -> Vec<(Link, VaultFile)> {
    let Some(metadata) = index.file_metadata(&file.path) else {
        return vec![];
    };

    metadata
        .links
        .iter()
        .filter_map(|link| {
            let target = index.resolve_link(&link.raw_target, &file.path)?;
            Some((link.clone(), target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlinks::ForwardScan;
    use crate::config::NewLinkFormat;
    use crate::host::FileStore;
    use crate::redirect::{get_redirect_files, resolve_redirect_target};
    use crate::test_utils::{create_test_vault, create_test_vault_with};
    use crate::vault::Vault;

    #[test]
    fn test_move_besides_target() {
        let (_temp_dir, vault_dir, mut vault) = create_test_vault(&[
            ("A/redirect.md", "#redirect\n[[target]]"),
            ("B/target.md", ""),
        ]);
        let settings = Settings::default();
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();
        let redirects = get_redirect_files(&vault);

        assert_eq!(mover.move_redirect_files(&mut vault, &redirects).unwrap(), 1);
        assert!(vault_dir.join("B").join("redirect.md").is_file());
        assert!(!vault_dir.join("A").join("redirect.md").exists());

        let redirects = get_redirect_files(&vault);
        assert_eq!(mover.move_redirect_files(&mut vault, &redirects).unwrap(), 0);
    }

    #[test]
    fn test_ambiguous_and_unresolved_stay() {
        let (_temp_dir, _vault_dir, mut vault) = create_test_vault(&[
            ("A/two.md", "#redirect\n[[target]] [[other]]"),
            ("A/none.md", "#redirect\n[[missing]]"),
            ("A/empty.md", "#redirect"),
            ("B/target.md", ""),
            ("B/other.md", ""),
        ]);
        let settings = Settings::default();
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();
        let redirects = get_redirect_files(&vault);

        assert_eq!(mover.move_redirect_files(&mut vault, &redirects).unwrap(), 0);
        assert!(vault.file("A/two.md").is_some());
    }

    #[test]
    fn test_occupied_destination_is_skipped() {
        let (_temp_dir, _vault_dir, mut vault) = create_test_vault(&[
            ("A/note.md", "#redirect\n[[B/target]]"),
            ("B/note.md", "taken"),
            ("B/target.md", ""),
        ]);
        let settings = Settings::default();
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();

        assert!(!mover
            .move_if_necessary(&mut vault, &VaultFile::new("A/note.md"))
            .unwrap());
        assert!(vault.file("A/note.md").is_some());
    }

    #[test]
    fn test_path_links_follow_the_move() {
        let settings = Settings {
            new_link_format: NewLinkFormat::Absolute,
            ..Settings::default()
        };
        let (_temp_dir, vault_dir, mut vault) = create_test_vault_with(
            &settings,
            &[
                ("A/redirect.md", "#redirect\n[[B/target]]"),
                ("B/target.md", ""),
                ("linker.md", "[[A/redirect|shown]] and [[redirect]]"),
            ],
        );
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();

        assert!(mover
            .move_if_necessary(&mut vault, &VaultFile::new("A/redirect.md"))
            .unwrap());

        assert_eq!(
            std::fs::read_to_string(vault_dir.join("linker.md")).unwrap(),
            "[[B/redirect|shown]] and [[redirect]]"
        );
        assert_eq!(
            vault
                .resolve_link("B/redirect", "linker.md")
                .map(|file| file.path),
            Some("B/redirect.md".into())
        );
    }

    #[test]
    fn test_relative_links_of_moved_file_are_rebased() {
        let (_temp_dir, vault_dir, mut vault) = create_test_vault(&[
            ("A/r.md", "#redirect\n[[./sub/target]]"),
            ("A/sub/target.md", ""),
            ("linker.md", "[[r]]"),
        ]);
        let settings = Settings::default();
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();

        assert!(mover
            .move_if_necessary(&mut vault, &VaultFile::new("A/r.md"))
            .unwrap());

        assert_eq!(
            std::fs::read_to_string(vault_dir.join("A/sub/r.md")).unwrap(),
            "#redirect\n[[target]]"
        );
        assert_eq!(
            resolve_redirect_target(&vault, &VaultFile::new("A/sub/r.md")).map(|file| file.path),
            Some("A/sub/target.md".into())
        );
        assert_eq!(
            std::fs::read_to_string(vault_dir.join("linker.md")).unwrap(),
            "[[r]]"
        );
    }

    #[test]
    fn test_links_untouched_when_disabled() {
        let settings = Settings {
            update_links_on_move: false,
            ..Settings::default()
        };
        let (_temp_dir, vault_dir, mut vault) = create_test_vault_with(
            &settings,
            &[
                ("A/redirect.md", "#redirect\n[[B/target]]"),
                ("B/target.md", ""),
                ("linker.md", "[[A/redirect]]"),
            ],
        );
        let finder = ForwardScan;
        let mut mover = Mover::<Vault>::new(&settings, &finder).unwrap();

        assert!(mover
            .move_if_necessary(&mut vault, &VaultFile::new("A/redirect.md"))
            .unwrap());
        assert_eq!(
            std::fs::read_to_string(vault_dir.join("linker.md")).unwrap(),
            "[[A/redirect]]"
        );
    }
}
