//! Line-oriented commands for driving a [`FileSystem`] from text.
//!
//! One command per line:
//!
//! ```text
//! mkdir /docs
//! write /docs/a hello\nworld
//! read /docs/a
//! ls /docs
//! ```

use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::fs::FileSystem;
use crate::storage::BlockStorage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Create(String),
    Write { path: String, text: String },
    Read(String),
    Ls(String),
    Delete(String),
    Stat(String),
    Df,
    Fsck,
    Journal,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let path = || -> Result<String> {
            let path = rest.trim();
            if path.is_empty() {
                bail!("{name}: missing path");
            }
            Ok(path.to_owned())
        };

        let command = match name {
            "mkdir" => Command::Mkdir(path()?),
            "create" | "touch" => Command::Create(path()?),
            "write" => {
                let rest = rest.trim_start();
                let (path, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if path.is_empty() {
                    bail!("write: missing path");
                }

                Command::Write {
                    path: path.to_owned(),
                    text: unescape(text),
                }
            }
            "read" | "cat" => Command::Read(path()?),
            "ls" => Command::Ls(match rest.trim() {
                "" => "/".to_owned(),
                path => path.to_owned(),
            }),
            "rm" | "delete" => Command::Delete(path()?),
            "stat" => Command::Stat(path()?),
            "df" => Command::Df,
            "fsck" => Command::Fsck,
            "journal" => Command::Journal,
            other => bail!("unknown command: {other}"),
        };

        Ok(command)
    }
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    line.parse().map(Some)
}

/// Runs a command, returning the text to show the user.
pub fn execute<S: BlockStorage>(fs: &mut FileSystem<S>, command: Command) -> Result<String> {
    let output = match command {
        Command::Mkdir(path) => {
            fs.mkdir(&path)?;
            "directory created".to_owned()
        }
        Command::Create(path) => {
            fs.create(&path)?;
            "file created".to_owned()
        }
        Command::Write { path, text } => {
            fs.write(&path, &text)?;
            format!("wrote {} bytes", text.len())
        }
        Command::Read(path) => fs.read(&path)?,
        Command::Ls(path) => fs.ls(&path)?.join("\n"),
        Command::Delete(path) => {
            fs.delete(&path)?;
            "deleted".to_owned()
        }
        Command::Stat(path) => {
            serde_json::to_string(&fs.stat(&path)?).context("serializing metadata")?
        }
        Command::Df => serde_json::to_string(&fs.statfs()).context("serializing usage")?,
        Command::Fsck => {
            fs.check().context("filesystem is inconsistent")?;
            "filesystem is consistent".to_owned()
        }
        Command::Journal => fs
            .journal()
            .read_all()
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .context("serializing journal")?
            .join("\n"),
    };

    Ok(output)
}

/// Expands `\n`, `\t` and `\\` so multi-line text fits on one script line.
fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    unescaped
}

#[cfg(test)]
mod tests {
    use crate::error::FsError;
    use crate::layout::block::Geometry;

    use super::*;

    mod parse {
        use super::*;

        #[test]
        fn test_path_commands() {
            assert_eq!(
                "mkdir /a".parse::<Command>().unwrap(),
                Command::Mkdir("/a".into())
            );
            assert_eq!(
                "touch /a/f".parse::<Command>().unwrap(),
                Command::Create("/a/f".into())
            );
            assert_eq!(
                "cat /a/f".parse::<Command>().unwrap(),
                Command::Read("/a/f".into())
            );
            assert_eq!(
                "rm /a".parse::<Command>().unwrap(),
                Command::Delete("/a".into())
            );
        }

        #[test]
        fn test_ls_defaults_to_root() {
            assert_eq!(
                "ls".parse::<Command>().unwrap(),
                Command::Ls("/".into())
            );
            assert_eq!(
                "ls /a".parse::<Command>().unwrap(),
                Command::Ls("/a".into())
            );
        }

        #[test]
        fn test_write_keeps_spacing() {
            assert_eq!(
                "write /f hello  big world ".parse::<Command>().unwrap(),
                Command::Write {
                    path: "/f".into(),
                    text: "hello  big world ".into()
                }
            );
        }

        #[test]
        fn test_write_split_on_tab() {
            assert_eq!(
                "write\t/f\thello world".parse::<Command>().unwrap(),
                Command::Write {
                    path: "/f".into(),
                    text: "hello world".into()
                }
            );
        }

        #[test]
        fn test_write_escapes() {
            assert_eq!(
                r"write /f a\nb\tc\\d\q".parse::<Command>().unwrap(),
                Command::Write {
                    path: "/f".into(),
                    text: "a\nb\tc\\d\\q".into()
                }
            );
        }

        #[test]
        fn test_write_without_text() {
            assert_eq!(
                "write /f".parse::<Command>().unwrap(),
                Command::Write {
                    path: "/f".into(),
                    text: String::new()
                }
            );
        }

        #[test]
        fn test_missing_path() {
            assert!("mkdir".parse::<Command>().is_err());
            assert!("write".parse::<Command>().is_err());
            assert!("stat   ".parse::<Command>().is_err());
        }

        #[test]
        fn test_unknown_command() {
            assert!("format /".parse::<Command>().is_err());
        }

        #[test]
        fn test_blank_and_comment_lines() {
            assert_eq!(parse_line("").unwrap(), None);
            assert_eq!(parse_line("   ").unwrap(), None);
            assert_eq!(parse_line("# setup").unwrap(), None);
            assert_eq!(parse_line("df").unwrap(), Some(Command::Df));
        }
    }

    mod execute {
        use super::*;

        fn run(fs: &mut FileSystem, line: &str) -> Result<String> {
            let command = parse_line(line)?.expect("not a blank line");
            execute(fs, command)
        }

        #[test]
        fn test_session() {
            let mut fs = FileSystem::with_geometry(Geometry::new(16, 8).unwrap());

            assert_eq!(run(&mut fs, "mkdir /docs").unwrap(), "directory created");
            assert_eq!(run(&mut fs, "create /docs/b").unwrap(), "file created");
            assert_eq!(
                run(&mut fs, r"write /docs/a one\ntwo").unwrap(),
                "wrote 7 bytes"
            );
            assert_eq!(run(&mut fs, "read /docs/a").unwrap(), "one\ntwo");
            assert_eq!(run(&mut fs, "ls /docs").unwrap(), "b\na");
            assert_eq!(run(&mut fs, "rm /docs/b").unwrap(), "deleted");
            assert_eq!(run(&mut fs, "ls /docs").unwrap(), "a");
            assert_eq!(run(&mut fs, "fsck").unwrap(), "filesystem is consistent");
        }

        #[test]
        fn test_errors_keep_their_kind() {
            let mut fs = FileSystem::with_geometry(Geometry::new(16, 8).unwrap());
            let err = run(&mut fs, "read /nope").unwrap_err();

            assert!(matches!(
                err.downcast_ref::<FsError>(),
                Some(FsError::NotFound(_))
            ));
            assert_eq!(err.to_string(), "not found: /nope");
        }

        #[test]
        fn test_df_and_journal() {
            let mut fs = FileSystem::with_geometry(Geometry::new(16, 8).unwrap());
            run(&mut fs, "write /f x").unwrap();

            let usage: serde_json::Value =
                serde_json::from_str(&run(&mut fs, "df").unwrap()).unwrap();
            assert_eq!(usage["used_blocks"], 1);
            assert_eq!(usage["free_blocks"], 7);

            assert_eq!(
                run(&mut fs, "journal").unwrap(),
                "{\"type\":\"intent\",\"action\":\"write\",\"path\":\"/f\"}\n\
                 {\"type\":\"commit\",\"action\":\"write\",\"path\":\"/f\"}"
            );
        }

        #[test]
        fn test_stat() {
            let mut fs = FileSystem::with_geometry(Geometry::new(16, 8).unwrap());
            run(&mut fs, "write /f 0123456789abcdefg").unwrap();

            let metadata: serde_json::Value =
                serde_json::from_str(&run(&mut fs, "stat /f").unwrap()).unwrap();
            assert_eq!(metadata["kind"], "regular");
            assert_eq!(metadata["size"], 17);
            assert_eq!(metadata["blocks"], 2);
        }
    }
}
