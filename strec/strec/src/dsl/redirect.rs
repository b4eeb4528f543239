//! Redirection sinks for `tee`/`print`/`emit`/`dump` statements: one open
//! handle per distinct evaluated target string, opened on first touch
//! (which is when truncate-vs-append is decided). `stdout` and `stderr`
//! are reserved target keywords; `|` targets pipe to a shell command.

use std::fs::OpenOptions;
use std::io::Write;
use std::process::{Child, Command, Stdio};

use indexmap::IndexMap;

use strec_dsl::ast::RedirectMode;

use crate::errors::{Error, Result};
use crate::options::WriterOpts;
use crate::output::{make_writer, RecordWriter};
use crate::record::Record;

enum Sink {
    Stdout,
    Stderr,
    File(std::io::BufWriter<std::fs::File>),
    Pipe(Child),
}

struct Entry {
    sink: Sink,
    writer: Box<dyn RecordWriter>,
}

pub struct RedirectCache {
    entries: IndexMap<String, Entry>,
    writer_opts: WriterOpts,
}

impl RedirectCache {
    pub fn new(writer_opts: WriterOpts) -> RedirectCache {
        RedirectCache {
            entries: IndexMap::new(),
            writer_opts,
        }
    }

    fn entry(&mut self, mode: RedirectMode, target: &str) -> Result<&mut Entry> {
        if !self.entries.contains_key(target) {
            let sink = match (mode, target) {
                (_, "stdout") => Sink::Stdout,
                (_, "stderr") => Sink::Stderr,
                (RedirectMode::Pipe, cmd) => {
                    let child = Command::new("sh")
                        .arg("-c")
                        .arg(cmd)
                        .stdin(Stdio::piped())
                        .spawn()
                        .map_err(Error::Io)?;
                    Sink::Pipe(child)
                }
                (mode, path) => {
                    let file = OpenOptions::new()
                        .write(true)
                        .create(true)
                        .append(mode == RedirectMode::Append)
                        .truncate(mode == RedirectMode::Write)
                        .open(path)?;
                    Sink::File(std::io::BufWriter::new(file))
                }
            };
            self.entries.insert(
                target.to_string(),
                Entry {
                    sink,
                    writer: make_writer(&self.writer_opts),
                },
            );
        }
        Ok(self.entries.get_mut(target).unwrap())
    }

    pub fn write_text(&mut self, mode: RedirectMode, target: &str, text: &str) -> Result<()> {
        let entry = self.entry(mode, target)?;
        with_sink(&mut entry.sink, |w| w.write_all(text.as_bytes()))?;
        Ok(())
    }

    pub fn write_record(&mut self, mode: RedirectMode, target: &str, rec: &Record) -> Result<()> {
        let entry = self.entry(mode, target)?;
        let writer = &mut entry.writer;
        match &mut entry.sink {
            Sink::Stdout => {
                let stdout = std::io::stdout();
                writer.write(rec, &mut stdout.lock())?;
            }
            Sink::Stderr => {
                let stderr = std::io::stderr();
                writer.write(rec, &mut stderr.lock())?;
            }
            Sink::File(f) => writer.write(rec, f)?,
            Sink::Pipe(child) => {
                let stdin = child.stdin.as_mut().ok_or_else(|| {
                    Error::Invariant("pipe target lost its stdin handle".to_string())
                })?;
                writer.write(rec, stdin)?;
            }
        }
        Ok(())
    }

    /// Flush and close every handle; pipes are waited on.
    pub fn close_all(&mut self) -> Result<()> {
        for (_, mut entry) in self.entries.drain(..) {
            match &mut entry.sink {
                Sink::Stdout => {
                    let stdout = std::io::stdout();
                    entry.writer.finish(&mut stdout.lock())?;
                }
                Sink::Stderr => {
                    let stderr = std::io::stderr();
                    entry.writer.finish(&mut stderr.lock())?;
                }
                Sink::File(f) => {
                    entry.writer.finish(f)?;
                    f.flush()?;
                }
                Sink::Pipe(child) => {
                    if let Some(stdin) = child.stdin.as_mut() {
                        entry.writer.finish(stdin)?;
                    }
                    drop(child.stdin.take());
                    let _ = child.wait();
                }
            }
        }
        Ok(())
    }
}

fn with_sink<T>(sink: &mut Sink, f: impl FnOnce(&mut dyn Write) -> std::io::Result<T>) -> Result<T> {
    let result = match sink {
        Sink::Stdout => {
            let stdout = std::io::stdout();
            f(&mut stdout.lock())
        }
        Sink::Stderr => {
            let stderr = std::io::stderr();
            f(&mut stderr.lock())
        }
        Sink::File(file) => f(file),
        Sink::Pipe(child) => match child.stdin.as_mut() {
            Some(stdin) => f(stdin),
            None => {
                return Err(Error::Invariant(
                    "pipe target lost its stdin handle".to_string(),
                ))
            }
        },
    };
    result.map_err(Error::Io)
}
