use gitviz::render::render_text;
use graph::{build_graph, Commit};

fn main() {
    println!("gitviz Graph Demo");
    println!("=================\n");

    let scenarios = [
        (
            "HEAD on the active branch",
            vec![Commit::new("A").with_refs(["HEAD", "main"])],
            "main",
            None,
        ),
        (
            "Detached HEAD",
            vec![Commit::new("A").with_refs(["HEAD"])],
            "",
            None,
        ),
        (
            "Linear history",
            vec![Commit::new("A").with_parents(["B"]), Commit::new("B")],
            "",
            None,
        ),
        (
            "Unreachable commit",
            vec![Commit::new("A").with_refs(["HEAD", "main"])],
            "main",
            Some(vec![Commit::new("Z").with_parents(["A"])]),
        ),
    ];

    for (title, commits, active, unreachable) in scenarios {
        let graph = build_graph(&commits, active, unreachable.as_deref());
        println!("{}:", title);
        print!("{}", render_text(&graph, false));
        println!();
    }
}
