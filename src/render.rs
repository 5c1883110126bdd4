use anyhow::Result;
use graph::{CommitGraph, EdgeType, Vertex, VertexIdx, VertexKind};

/// Display label for a vertex: short hash, reference name, or `HEAD`
pub fn label(vertex: &Vertex) -> String {
    match &vertex.kind {
        VertexKind::Commit(commit) => commit.short_hash().to_string(),
        VertexKind::Reference(reference) => reference.name.clone(),
    }
}

/// Decorations git would print next to a commit, e.g. `HEAD -> main, v1.0`
fn decorations(graph: &CommitGraph, commit: VertexIdx) -> Vec<String> {
    let head_via = |target: VertexIdx| {
        graph
            .head()
            .is_some_and(|head| graph.successors(head).any(|(to, ty)| to == target && ty == EdgeType::HeadResolution))
    };

    let mut decorations = Vec::new();
    if head_via(commit) {
        decorations.push("HEAD".to_string());
    }
    for edge in graph.edges() {
        if edge.target != commit || edge.edge_type != EdgeType::RefTarget {
            continue;
        }
        let name = label(graph.vertex(edge.source));
        if head_via(edge.source) {
            decorations.push(format!("HEAD -> {}", name));
        } else {
            decorations.push(name);
        }
    }
    decorations
}

/// One line per commit followed by the edge list
pub fn render_text(graph: &CommitGraph, show_comments: bool) -> String {
    let stats = graph.stats();
    let mut out = format!(
        "{} commits ({} orphan, {} merge), {} references, {} edges\n",
        stats.total_commits, stats.orphan_commits, stats.merge_commits, stats.references, stats.total_edges
    );

    for (idx, vertex) in graph.vertices() {
        let Some(commit) = vertex.as_commit() else { continue };
        let marker = if vertex.orphan { '?' } else { '*' };
        out.push_str(&format!("{} {}", marker, commit.short_hash()));
        let decorations = decorations(graph, idx);
        if !decorations.is_empty() {
            out.push_str(&format!(" ({})", decorations.join(", ")));
        }
        if show_comments {
            if let Some(subject) = commit.subject.as_deref().filter(|s| !s.is_empty()) {
                out.push(' ');
                out.push_str(subject);
            }
        }
        out.push('\n');
    }

    if graph.edge_count() > 0 {
        out.push_str("edges:\n");
        for edge in graph.edges() {
            let arrow = match edge.edge_type {
                EdgeType::Ancestry => "->",
                EdgeType::RefTarget => "=>",
                EdgeType::HeadResolution => "~>",
            };
            out.push_str(&format!(
                "  {} {} {}\n",
                label(graph.vertex(edge.source)),
                arrow,
                label(graph.vertex(edge.target))
            ));
        }
    }
    out
}

pub fn render_json(graph: &CommitGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::{build_graph, Commit};
    use pretty_assertions::assert_eq;

    #[test]
    fn text_shows_head_through_branch() {
        let commits = vec![
            Commit::new("aaaaaaaaaa")
                .with_parents(["bbbbbbbbbb"])
                .with_refs(["HEAD", "main", "v1"])
                .with_subject("Second"),
            Commit::new("bbbbbbbbbb").with_subject("First"),
        ];
        let graph = build_graph(&commits, "main", None);

        assert_eq!(
            render_text(&graph, true),
            "2 commits (0 orphan, 0 merge), 2 references, 4 edges\n\
             * aaaaaaa (HEAD -> main, v1) Second\n\
             * bbbbbbb First\n\
             edges:\n  \
             main => aaaaaaa\n  \
             HEAD ~> main\n  \
             v1 => aaaaaaa\n  \
             aaaaaaa -> bbbbbbb\n"
        );
    }

    #[test]
    fn text_marks_detached_head_and_orphans() {
        let commits = vec![Commit::new("aaaaaaaaaa").with_refs(["HEAD"])];
        let orphans = vec![Commit::new("zzzzzzzzzz").with_subject("lost")];
        let graph = build_graph(&commits, "", Some(orphans.as_slice()));

        assert_eq!(
            render_text(&graph, false),
            "2 commits (1 orphan, 0 merge), 0 references, 1 edges\n\
             * aaaaaaa (HEAD)\n\
             ? zzzzzzz\n\
             edges:\n  \
             HEAD ~> aaaaaaa\n"
        );
    }

    #[test]
    fn json_lists_vertices_and_edges() {
        let commits = vec![Commit::new("A").with_parents(["B"]), Commit::new("B")];
        let graph = build_graph(&commits, "", None);
        let value: serde_json::Value = serde_json::from_str(&render_json(&graph).unwrap()).unwrap();

        assert_eq!(value["vertices"].as_array().unwrap().len(), 2);
        assert_eq!(value["vertices"][0]["kind"], "commit");
        assert_eq!(value["vertices"][0]["hash"], "A");
        assert_eq!(value["edges"][0]["source"], 0);
        assert_eq!(value["edges"][0]["target"], 1);
        assert_eq!(value["edges"][0]["edge_type"], "ancestry");
    }
}
