use ego_tree::NodeRef;
use mt_core::escape_percent;
use regex::{Captures, Regex};
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};

// Private-use codepoints around the block index; html2md passes them through
// and post text does not contain them.
const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// Plain `html2md` conversion without any extra rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    pub fence: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            fence: "```".to_string(),
        }
    }
}

/// Post body converter: `html2md` for everything except code blocks, which
/// become fenced blocks holding the code's exact text. `%` is escaped in the
/// result.
///
/// A `<pre>` is a code block when its first child is a `<code>` element or its
/// class is exactly `prettyprint`.
#[derive(Debug, Clone)]
pub struct PostConverter {
    options: ConverterOptions,
    placeholder: Regex,
}

impl PostConverter {
    pub fn new(options: ConverterOptions) -> Self {
        let placeholder = Regex::new(&format!("{PLACEHOLDER_OPEN}([0-9]+){PLACEHOLDER_CLOSE}"))
            .expect("placeholder pattern");
        Self {
            options,
            placeholder,
        }
    }

    fn fenced_block(&self, pre: ElementRef) -> String {
        let code = first_child_code(pre);
        let language = code
            .and_then(|code| language_of(code.value()))
            .or_else(|| language_of(pre.value()))
            .unwrap_or_default();
        let text: String = code.unwrap_or(pre).text().collect();
        let fence = &self.options.fence;
        format!("{fence}{language}\n{text}\n{fence}")
    }

    fn lift_code_blocks(&self, node: NodeRef<Node>, html: &mut String, blocks: &mut Vec<String>) {
        match node.value() {
            Node::Text(text) => html.push_str(&escape_text(text)),
            Node::Element(element) => {
                let Some(element_ref) = ElementRef::wrap(node) else {
                    return;
                };
                if is_code_block(element_ref) {
                    html.push_str(&format!(
                        "<p>{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}</p>",
                        blocks.len()
                    ));
                    blocks.push(self.fenced_block(element_ref));
                } else if !contains_code_block(element_ref) {
                    html.push_str(&element_ref.html());
                } else {
                    push_open_tag(element, html);
                    for child in node.children() {
                        self.lift_code_blocks(child, html, blocks);
                    }
                    html.push_str(&format!("</{}>", element.name()));
                }
            }
            Node::Comment(_) => {}
            _ => {
                for child in node.children() {
                    self.lift_code_blocks(child, html, blocks);
                }
            }
        }
    }
}

impl Default for PostConverter {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

impl Converter for PostConverter {
    fn to_markdown(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut lifted = String::with_capacity(html.len());
        let mut blocks = Vec::new();
        for child in fragment.root_element().children() {
            self.lift_code_blocks(child, &mut lifted, &mut blocks);
        }

        let markdown = html2md::parse_html(&lifted);
        let markdown = self.placeholder.replace_all(&markdown, |caps: &Captures| {
            let Some(block) = caps[1].parse::<usize>().ok().and_then(|idx| blocks.get(idx)) else {
                return String::new();
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            let line_start = markdown[..start].rfind('\n').map_or(0, |idx| idx + 1);
            indent_block(block, &markdown[line_start..start])
        });

        escape_percent(markdown.trim())
    }
}

/// Continue a block placed after `prefix` (blockquote markers, list
/// indentation) on every following line, so it stays inside its container.
/// List markers in the prefix become spaces.
fn indent_block(block: &str, prefix: &str) -> String {
    let continuation: String = prefix
        .chars()
        .map(|c| if c == '>' || c.is_whitespace() { c } else { ' ' })
        .collect();
    let mut lines = block.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(&continuation);
        out.push_str(line);
    }
    out
}

fn is_code_block(element: ElementRef) -> bool {
    if !element.value().name().eq_ignore_ascii_case("pre") {
        return false;
    }
    first_child_code(element).is_some() || element.value().attr("class") == Some("prettyprint")
}

fn contains_code_block(element: ElementRef) -> bool {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(is_code_block)
}

fn first_child_code(pre: ElementRef) -> Option<ElementRef> {
    pre.first_child()
        .and_then(ElementRef::wrap)
        .filter(|child| child.value().name().eq_ignore_ascii_case("code"))
}

fn language_of(element: &Element) -> Option<String> {
    element
        .classes()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
        .map(ToOwned::to_owned)
}

fn push_open_tag(element: &Element, html: &mut String) {
    html.push('<');
    html.push_str(element.name());
    for (name, value) in element.attrs() {
        html.push(' ');
        html.push_str(name);
        html.push_str("=\"");
        html.push_str(&value.replace('&', "&amp;").replace('"', "&quot;"));
        html.push('"');
    }
    html.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_comes_from_code_then_pre() {
        let html = Html::parse_fragment(r#"<pre class="language-sh"><code class="x language-go">a</code></pre>"#);
        let pre = html
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .unwrap();
        let code = first_child_code(pre).unwrap();
        assert_eq!(language_of(code.value()).as_deref(), Some("go"));
        assert_eq!(language_of(pre.value()).as_deref(), Some("sh"));
    }

    #[test]
    fn block_lines_continue_the_prefix() {
        assert_eq!(indent_block("```\na\n```", "> "), "```\n> a\n> ```");
        assert_eq!(indent_block("```\na\n```", "> 1. "), "```\n>    a\n>    ```");
        assert_eq!(indent_block("```\na\n```", ""), "```\na\n```");
    }

    #[test]
    fn pre_with_leading_text_is_not_a_code_block() {
        let html = Html::parse_fragment("<pre> <code>a</code></pre>");
        let pre = html
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .unwrap();
        assert!(!is_code_block(pre));
    }
}
