//! Interactive prompt loop
//!
//! One query per line, each fully answered before the next is read.

use std::io::{BufRead, Write};

use semsearch_core::{Config, Embedder, SearchError, Session};

use crate::render;

const PROMPT: &str = "> ";
const HELP: &str = "Type a query and press Enter. Commands: :reload, :info, :help, :quit";
const INVALID_UTF8: &str = "Input is not valid UTF-8. Please retype the query.";

/// Prompt loop over a borrowed embedder
///
/// Keeps running when the document source is missing or empty so the user
/// can fix it and `:reload`.
pub struct Repl<'a, E> {
    config: Config,
    embedder: &'a E,
    session: Option<Session<&'a E>>,
}

impl<'a, E: Embedder> Repl<'a, E> {
    pub fn new(config: Config, embedder: &'a E) -> Self {
        Self {
            config,
            embedder,
            session: None,
        }
    }

    /// Whether a corpus is loaded and queries can run
    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Run until EOF or `:quit`.
    ///
    /// Load and search failures are printed and the prompt continues.
    ///
    /// # Errors
    /// I/O errors reading `input` or writing `out`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
    ) -> Result<(), SearchError> {
        writeln!(out, "{HELP}")?;
        self.load(out)?;

        let mut buf = Vec::new();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                break;
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                writeln!(out, "{INVALID_UTF8}")?;
                continue;
            };

            match line.trim() {
                ":quit" | ":q" | ":exit" => break,
                ":help" => writeln!(out, "{HELP}")?,
                ":reload" => self.load(out)?,
                ":info" => match &self.session {
                    Some(session) => render::write_stats(out, &session.stats())?,
                    None => writeln!(out, "No documents loaded.")?,
                },
                query => self.answer(query, out)?,
            }
        }

        Ok(())
    }

    fn load<W: Write>(&mut self, out: &mut W) -> Result<(), SearchError> {
        let loaded = match self.session.as_mut() {
            Some(session) => session.reload().map(|status| status.warning().cloned()),
            None => Session::open(self.config.clone(), self.embedder).map(|session| {
                let warning = session.cache_status().warning().cloned();
                self.session = Some(session);
                warning
            }),
        };

        match loaded {
            Ok(warning) => {
                if let Some(warning) = warning {
                    writeln!(out, "Warning: {warning}. Embeddings were regenerated.")?;
                }
                if let Some(session) = &self.session {
                    writeln!(out, "Documents loaded: {}", session.corpus().len())?;
                }
                Ok(())
            }
            Err(e) if e.is_user_facing() => {
                tracing::warn!("{}", e);
                writeln!(out, "{e}. Fix the document source and type :reload.")?;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Load failed: {}", e);
                if self.session.is_some() {
                    writeln!(out, "Error: {e}. Keeping the previously loaded documents.")?;
                } else {
                    writeln!(out, "Error: {e}")?;
                }
                Ok(())
            }
        }
    }

    fn answer<W: Write>(&self, query: &str, out: &mut W) -> Result<(), SearchError> {
        let Some(session) = &self.session else {
            writeln!(out, "No documents loaded. Fix the document source and type :reload.")?;
            return Ok(());
        };

        if query.is_empty() {
            writeln!(out, "{}", render::EMPTY_QUERY_PROMPT)?;
            return Ok(());
        }

        match session.search(query) {
            Ok(results) => render::write_results(out, &results)?,
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                writeln!(out, "Error: {e}")?;
            }
        }
        Ok(())
    }
}
