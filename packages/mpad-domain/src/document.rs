//! Flattening of the editor's JSON document format into markdown-flavoured text.
//!
//! Note bodies are stored verbatim as the editor's serialized state (`{"root": {...}}`). The
//! flattened text is only used as embedding input, so formatting is lossy on purpose: unknown
//! node types are skipped and inline formatting is dropped.

use std::fmt::Write;

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct Document {
	root: Node,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Node {
	#[serde(rename = "type")]
	kind: String,
	tag: String,
	children: Vec<Node>,
	text: String,
	list_type: String,
	language: Option<String>,
}

/// Renders a serialized document body to plain text.
pub fn render_plain_text(body: &str) -> Result<String> {
	let doc: Document = serde_json::from_str(body)
		.map_err(|err| Error::InvalidDocument { message: err.to_string() })?;
	let mut out = String::new();

	render_node(&mut out, &doc.root);

	Ok(out)
}

/// Builds the text sent to the embedding provider for a note: a title heading followed by the
/// rendered body.
pub fn embedding_input(title: &str, body: &str) -> Result<String> {
	let rendered = render_plain_text(body)?;

	Ok(format!("# {title}\n{rendered}"))
}

fn render_node(out: &mut String, node: &Node) {
	match node.kind.as_str() {
		"root" => render_children(out, &node.children),
		"heading" => {
			out.push_str(&"#".repeat(heading_level(&node.tag)));
			out.push(' ');

			render_children(out, &node.children);

			out.push_str("\n\n");
		},
		"paragraph" => {
			render_children(out, &node.children);

			out.push_str("\n\n");
		},
		"text" | "code-highlight" => out.push_str(&node.text),
		"linebreak" => out.push('\n'),
		"tab" => out.push('\t'),
		"list" => {
			render_list(out, node);

			out.push('\n');
		},
		"code" => {
			out.push_str("```");

			if let Some(language) = node.language.as_deref() {
				out.push_str(language);
			}

			out.push('\n');

			render_children(out, &node.children);

			out.push_str("\n```\n\n");
		},
		"quote" => {
			out.push_str("> ");

			render_children(out, &node.children);

			out.push_str("\n\n");
		},
		_ => {},
	}
}

fn render_children(out: &mut String, children: &[Node]) {
	for child in children {
		render_node(out, child);
	}
}

fn render_list(out: &mut String, list: &Node) {
	for (idx, item) in list.children.iter().enumerate() {
		match list.list_type.as_str() {
			"bullet" => out.push_str("- "),
			"number" => {
				let _ = write!(out, "{}. ", idx + 1);
			},
			_ => {},
		}

		render_children(out, &item.children);

		out.push('\n');
	}
}

fn heading_level(tag: &str) -> usize {
	match tag {
		"h2" => 2,
		"h3" => 3,
		"h4" => 4,
		"h5" => 5,
		"h6" => 6,
		_ => 1,
	}
}
