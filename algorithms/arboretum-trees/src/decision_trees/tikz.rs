use std::fmt::{self, Debug};

use super::{DecisionTree, TreeNode};

/// Struct to print a fitted decision tree in LaTex using tikz and forest.
///
/// Internal nodes show the name of their split attribute and its gain, edges carry the attribute
/// value routed along them and leaves show their prediction.
///
/// ### Usage
///
/// ```rust
/// use arboretum::prelude::*;
/// use arboretum_trees::DecisionTree;
///
/// let dataset = Dataset::from_rows(
///     vec![vec!["sunny", "no"], vec!["rain", "yes"]],
///     1,
/// )
/// .unwrap()
/// .with_feature_names(vec!["outlook", "play"]);
///
/// // Fit the tree
/// let tree = DecisionTree::params().fit(&dataset).unwrap();
/// // Export to tikz
/// let tikz = tree.export_to_tikz().with_legend();
/// let latex_tree = tikz.to_string();
/// // Now you can write latex_tree to the preferred destination
/// assert!(latex_tree.contains("outlook"));
/// ```
pub struct Tikz<'a, V> {
    legend: bool,
    max_classes: usize,
    complete: bool,
    tree: &'a DecisionTree<V>,
}

impl<'a, V: Debug> Tikz<'a, V> {
    pub fn new(tree: &'a DecisionTree<V>) -> Self {
        Tikz {
            legend: false,
            max_classes: 4,
            complete: true,
            tree,
        }
    }

    fn format_classes(&self, node: &TreeNode<V>) -> String {
        let mut classes = node
            .classes()
            .iter()
            .take(self.max_classes)
            .map(|class| format!("{:?}", class))
            .collect::<Vec<_>>();
        if node.classes().len() > self.max_classes {
            classes.push("...".to_string());
        }

        classes.join(", ")
    }

    fn format_node(&self, node: &'a TreeNode<V>, names: &[String]) -> String {
        let depth = vec![""; node.level() + 1].join("\t");
        let edge = match node.branch() {
            Some(branch) => format!(", edge label={{node[midway, left] {{{:?}}}}}", branch),
            None => String::new(),
        };

        match (node.prediction(), node.attribute()) {
            (None, Some(attribute)) => {
                let name = names.get(attribute).map(String::as_str).unwrap_or("?");
                let mut out = format!(
                    "{}[{} \\\\ Gain ${:.2}$ \\\\ Classes: {}{}",
                    depth,
                    name,
                    node.gain(),
                    self.format_classes(node),
                    edge
                );
                let nodes = self.tree.nodes();
                for child in node.children() {
                    out.push('\n');
                    out.push_str(&self.format_node(&nodes[child.0], names));
                }
                out.push(']');

                out
            }
            _ => format!(
                "{}[Label: {:?} \\\\ Purity ${:.2}${}]",
                depth,
                node.majority_label(),
                node.purity(),
                edge
            ),
        }
    }

    /// Whether a complete Tex document should be generated
    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;

        self
    }

    /// Add a legend to the generated tree
    pub fn with_legend(mut self) -> Self {
        self.legend = true;

        self
    }

    /// The maximal number of classes printed in each node
    pub fn max_classes(mut self, max_classes: usize) -> Self {
        self.max_classes = max_classes;

        self
    }

    fn legend(&self, names: &[String]) -> String {
        let mut out = String::from("\n\\node [anchor=north west] at (current bounding box.north east) {%\n\\begin{tabular}{c c}\n");
        out.push_str("\\multicolumn{2}{@{}l@{}}{Legend:}\\\\\n");
        out.push_str("Column & Name \\\\\n");
        for (idx, name) in names.iter().enumerate() {
            if idx != self.tree.target_index() {
                out.push_str(&format!("{} & {} \\\\\n", idx, name));
            }
        }
        out.push_str("\\end{tabular}};");

        out
    }
}

impl<'a, V: Debug> fmt::Display for Tikz<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.tree.feature_names();
        let mut out = if self.complete {
            String::from(
                r#"
\documentclass[margin=10pt]{standalone}
\usepackage{tikz,forest}
\usetikzlibrary{arrows.meta}

\forestset{
default preamble={
for tree={
  edge+={thick, -Latex},
  s sep'+=1cm,
  draw,
  thick,
  align=center,
}
}
}

\begin{document}
\begin{forest}
"#,
            )
        } else {
            String::from("\\begin{forest}\n")
        };

        if let Some(root) = self.tree.nodes().first() {
            out.push_str(&self.format_node(root, &names));
        }
        if self.legend {
            out.push_str(&self.legend(&names));
        }

        out.push_str("\n\\end{forest}");
        if self.complete {
            out.push_str("\n\\end{document}");
        }

        write!(f, "{}", out)
    }
}
