//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced
//! code. Answers arrive complete (no streaming), so each one is rendered
//! in a single pass and followed by a dim sources footer.

use console::style;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use grepchat_types::index::Source;

const THEME: &str = "base16-ocean.dark";

pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a markdown answer.
    ///
    /// Fenced blocks are highlighted by syntect using the fence's language
    /// tag; all other lines go through termimad.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();

        for line in markdown.lines() {
            let is_fence = line.trim_start().starts_with("```");
            match (&code_lang, is_fence) {
                (None, true) => {
                    code_lang = Some(line.trim().trim_start_matches('`').trim().to_string());
                    code_buf.clear();
                }
                (Some(lang), true) => {
                    output.push_str(&self.highlight_code(&code_buf, lang));
                    output.push('\n');
                    code_lang = None;
                }
                (Some(_), false) => {
                    code_buf.push_str(line);
                    code_buf.push('\n');
                }
                (None, false) => {
                    output.push_str(&format!("{}", self.skin.term_text(line)));
                }
            }
        }

        // Unterminated fence: still show the code.
        if let Some(lang) = code_lang {
            if !code_buf.is_empty() {
                output.push_str(&self.highlight_code(&code_buf, &lang));
            }
        }

        output
    }

    /// Print the bot label, the rendered answer and its sources.
    pub fn print_answer(&self, bot_name: &str, markdown: &str, sources: &[Source]) {
        println!();
        println!("  {}", style(bot_name).cyan().bold());
        for line in self.render_markdown(markdown).lines() {
            println!("  {line}");
        }
        if let Some(footer) = sources_footer(sources) {
            println!("{footer}");
        }
        println!();
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("{}\n", style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(THEME) else {
            output.push_str(code);
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("{escaped}\x1b[0m\n"));
        }

        output
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Dim footer listing cited files, or `None` when there are no sources.
pub fn sources_footer(sources: &[Source]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    let mut footer = format!("\n  {}", style("Sources:").dim());
    for source in sources {
        footer.push_str(&format!("\n  {} {}", style("|").dim(), style(source.label()).dim()));
    }
    Some(footer)
}
