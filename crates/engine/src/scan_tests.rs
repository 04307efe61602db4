use super::*;
use tempfile::tempdir;

#[test]
fn empty_vault_yields_no_nodes() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    assert!(scan_thoughts(&vault).is_empty());
}

#[test]
fn classifies_map_frontmatter_and_reads_topics() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    std::fs::create_dir_all(vault.thoughts_dir()).unwrap();
    vault
        .write_atomic(
            &vault.thoughts_dir().join("overview.md"),
            "---\nid: overview\ntype: map\ntopics:\n  - rust\n  - storage\ncreated: 2026-01-01T00:00:00Z\n---\nbody text [[linked-thought]]\n",
        )
        .unwrap();
    vault
        .write_atomic(
            &vault.thoughts_dir().join("linked-thought.md"),
            "---\nid: linked-thought\nconfidence: tested\ncreated: 2026-01-02T00:00:00Z\n---\na plain thought\n",
        )
        .unwrap();

    let mut nodes = scan_thoughts(&vault);
    nodes.sort_by(|a, b| a.slug.cmp(&b.slug));

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].slug, "linked-thought");
    assert!(!nodes[0].is_map);
    assert_eq!(nodes[0].confidence, Some(vh_core::Confidence::Tested));

    assert_eq!(nodes[1].slug, "overview");
    assert!(nodes[1].is_map);
    assert_eq!(nodes[1].topics, vec!["rust".to_string(), "storage".to_string()]);
}

#[test]
fn malformed_frontmatter_still_yields_a_node() {
    let dir = tempdir().unwrap();
    let vault = Vault::new(dir.path().to_path_buf());
    std::fs::create_dir_all(vault.thoughts_dir()).unwrap();
    vault
        .write_atomic(&vault.thoughts_dir().join("broken.md"), "---\nid: [unterminated\n---\nbody\n")
        .unwrap();

    let nodes = scan_thoughts(&vault);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].slug, "broken");
}
