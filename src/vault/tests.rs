use itertools::Itertools;
use ropey::Rope;

use super::*;
use crate::config::{LinkStyle, NewLinkFormat, Settings};
use crate::error::RedirectorError;
use crate::host::{FileStore, LinkGenerator, MetadataIndex};
use crate::test_utils::{create_test_vault, create_test_vault_with};

fn parse_links(text: &str) -> Vec<Link> {
    let rope = Rope::from_str(text);
    Link::parse(text, &rope).map(|(_, link)| link).collect_vec()
}

fn range(line: usize, start: usize, end: usize) -> TextRange {
    TextRange {
        start: Position {
            line,
            character: start,
        },
        end: Position {
            line,
            character: end,
        },
    }
}

#[test]
fn wiki_link_parsing() {
    let text = "Test text test text [[link]]";

    let parsed = parse_links(text);

    let expected = vec![Link {
        raw_target: "link".into(),
        original: "[[link]]".into(),
        display: None,
        escaped_alias: false,
        range: range(0, 20, 28),
    }];
    assert_eq!(parsed, expected);
}

#[test]
fn wiki_link_with_alias_and_heading() {
    let text = "line one\nsee [[note#Part two|the note]] here";

    let parsed = parse_links(text);

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].raw_target, "note#Part two");
    assert_eq!(parsed[0].display.as_deref(), Some("the note"));
    assert_eq!(parsed[0].subpath(), Some("#Part two"));
    assert_eq!(parsed[0].range, range(1, 4, 30));
}

#[test]
fn wiki_link_with_escaped_alias_in_table() {
    let text = "| [[r\\|shown]] | x |\n[[plain|alias]]";

    let parsed = parse_links(text);

    assert_eq!(
        parsed[0],
        Link {
            raw_target: "r".into(),
            original: "[[r\\|shown]]".into(),
            display: Some("shown".into()),
            escaped_alias: true,
            range: range(0, 2, 14),
        }
    );
    assert_eq!(parsed[1].raw_target, "plain");
    assert!(!parsed[1].escaped_alias);
}

#[test]
fn md_link_parsing() {
    let text = "Test text test text [link](path/to/link.md)";

    let parsed = parse_links(text);

    let expected = vec![Link {
        raw_target: "path/to/link.md".into(),
        original: "[link](path/to/link.md)".into(),
        display: Some("link".into()),
        escaped_alias: false,
        range: range(0, 20, 43),
    }];
    assert_eq!(parsed, expected);
}

#[test]
fn md_link_targets_are_decoded() {
    let parsed = parse_links("[x](my%20note.md) [y](<other note.md>)");

    assert_eq!(
        parsed.iter().map(|l| l.raw_target.as_str()).collect_vec(),
        vec!["my note.md", "other note.md"]
    );
}

#[test]
fn links_are_in_document_order() {
    let parsed = parse_links("[md](b.md) [[wiki]]\n[[third]]");

    assert_eq!(
        parsed.iter().map(|l| l.raw_target.as_str()).collect_vec(),
        vec!["b.md", "wiki", "third"]
    );
}

#[test]
fn embeds_and_external_links_are_skipped() {
    let parsed = parse_links("![[image.png]] ![alt](pic.png) [site](https://example.com) [[]]");

    assert!(parsed.is_empty());
}

#[test]
fn links_in_code_and_front_matter_are_excluded() {
    let text = "---\nrelated: \"[[hidden]]\"\n---\n```\n[[in fence]]\n```\n`[[inline]]` [[real]]";

    let md_file = MDFile::new(&Settings::default(), text, VaultFile::new("a.md"));

    assert_eq!(
        md_file.links.iter().map(|l| l.raw_target.as_str()).collect_vec(),
        vec!["real"]
    );
}

#[test]
fn links_in_code_kept_when_enabled() {
    let settings = Settings {
        references_in_codeblocks: true,
        ..Settings::default()
    };
    let text = "```\n[[in fence]]\n```\n";

    let md_file = MDFile::new(&settings, text, VaultFile::new("a.md"));

    assert_eq!(md_file.links.len(), 1);
}

#[test]
fn tag_parsing() {
    let text = "#redirect\nsome text #Other and #123 not a tag\n```\n#code\n```";

    let md_file = MDFile::new(&Settings::default(), text, VaultFile::new("a.md"));

    assert_eq!(
        md_file.tags.iter().map(MDTag::tag).collect_vec(),
        vec!["#redirect", "#Other"]
    );
    assert_eq!(md_file.tags[0].range, range(0, 0, 9));
}

#[test]
fn front_matter_is_parsed() {
    let text = "---\nredirect: true\n---\n[[target]]";

    let md_file = MDFile::new(&Settings::default(), text, VaultFile::new("a.md"));

    let metadata = md_file.metadata.expect("front matter should parse");
    assert_eq!(metadata.redirect(), Some(&serde_yaml::Value::Bool(true)));
    assert_eq!(md_file.links[0].range, range(3, 0, 10));
}

#[test]
fn construct_vault_skips_hidden_and_non_markdown() {
    let (_temp_dir, _vault_dir, vault) = create_test_vault(&[
        ("a.md", "a"),
        ("B/b.md", "b"),
        (".obsidian/c.md", "c"),
        ("image.png", "png"),
    ]);

    assert_eq!(
        vault.markdown_files().into_iter().map(|f| f.path).collect_vec(),
        vec!["B/b.md", "a.md"]
    );
}

#[test]
fn resolve_by_name_path_and_relative() {
    let (_temp_dir, _vault_dir, vault) = create_test_vault(&[
        ("A/source.md", ""),
        ("A/target.md", ""),
        ("B/target.md", ""),
        ("B/other.md", ""),
    ]);

    let resolve = |target: &str| vault.resolve_link(target, "A/source.md").map(|f| f.path);

    assert_eq!(resolve("other"), Some("B/other.md".into()));
    assert_eq!(resolve("Other.md"), Some("B/other.md".into()));
    assert_eq!(resolve("target"), Some("A/target.md".into()));
    assert_eq!(resolve("B/target"), Some("B/target.md".into()));
    assert_eq!(resolve("../B/target.md"), Some("B/target.md".into()));
    assert_eq!(resolve("./target.md#heading"), Some("A/target.md".into()));
    assert_eq!(resolve("#heading"), Some("A/source.md".into()));
    assert_eq!(resolve("missing"), None);
    assert_eq!(resolve("../../escape"), None);
}

#[test]
fn generate_wikilink_shortest() {
    let (_temp_dir, _vault_dir, vault) = create_test_vault(&[
        ("A/unique.md", ""),
        ("A/dup.md", ""),
        ("B/dup.md", ""),
    ]);

    let unique = VaultFile::new("A/unique.md");
    let dup = VaultFile::new("B/dup.md");

    assert_eq!(
        vault.generate_markdown_link(&unique, "B/dup.md", None, None),
        "[[unique]]"
    );
    assert_eq!(
        vault.generate_markdown_link(&dup, "A/unique.md", Some("#Sec"), Some("alias")),
        "[[B/dup#Sec|alias]]"
    );
}

#[test]
fn generate_markdown_relative() {
    let settings = Settings {
        link_style: LinkStyle::Markdown,
        new_link_format: NewLinkFormat::Relative,
        ..Settings::default()
    };
    let (_temp_dir, _vault_dir, vault) =
        create_test_vault_with(&settings, &[("A/source.md", ""), ("B/my target.md", "")]);

    let target = VaultFile::new("B/my target.md");

    assert_eq!(
        vault.generate_markdown_link(&target, "A/source.md", None, None),
        "[my target](../B/my%20target.md)"
    );
    assert_eq!(
        vault.generate_markdown_link(&target, "B/x.md", Some("#a b"), Some("T")),
        "[T](./my%20target.md#a%20b)"
    );
}

#[test]
fn file_operations_keep_index_current() {
    let (_temp_dir, vault_dir, mut vault) = create_test_vault(&[("a.md", "[[b]]")]);

    vault.create("B/b.md", "#redirect\n[[a]]").unwrap();
    assert_eq!(vault.file_metadata("B/b.md").unwrap().tags.len(), 1);
    assert!(matches!(
        vault.create("a.md", "again"),
        Err(RedirectorError::FileExists(_))
    ));

    vault.modify("a.md", "[[b]] [[c]]").unwrap();
    assert_eq!(vault.file_metadata("a.md").unwrap().links.len(), 2);

    let moved = vault.rename("B/b.md", "C/b.md").unwrap();
    assert_eq!(moved.path, "C/b.md");
    assert!(vault.file("B/b.md").is_none());
    assert!(vault_dir.join("C").join("b.md").is_file());

    vault.delete("C/b.md").unwrap();
    assert!(vault.file("C/b.md").is_none());
    assert!(matches!(
        vault.delete("C/b.md"),
        Err(RedirectorError::FileNotFound(_))
    ));
}

#[test]
fn process_writes_only_on_change() {
    let (_temp_dir, vault_dir, mut vault) = create_test_vault(&[("a.md", "old")]);

    assert!(!vault.process("a.md", |_| None).unwrap());
    assert!(vault
        .process("a.md", |content| Some(content.replace("old", "new")))
        .unwrap());

    assert_eq!(
        std::fs::read_to_string(vault_dir.join("a.md")).unwrap(),
        "new"
    );
}

#[test]
fn link_graph_incoming_edges() {
    let (_temp_dir, _vault_dir, vault) = create_test_vault(&[
        ("a.md", "[[target]] and [[other]] and [[target|again]]"),
        ("b.md", "[[target]]"),
        ("target.md", ""),
        ("other.md", "[[missing]]"),
    ]);

    let graph = LinkGraph::build(&vault);
    let incoming = graph.incoming(&vault, "target.md");

    assert_eq!(graph.edge_count(), 4);
    assert_eq!(
        incoming
            .iter()
            .map(|edge| (edge.source.path.as_str(), edge.link_index))
            .collect_vec(),
        vec![("a.md", 0), ("a.md", 2), ("b.md", 0)]
    );
    assert_eq!(incoming[1].link.display.as_deref(), Some("again"));
    assert!(graph.incoming(&vault, "missing.md").is_empty());
}
