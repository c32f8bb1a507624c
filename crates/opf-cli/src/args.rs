use opf_core::{LayerId, LayerSelection};
use std::path::PathBuf;

pub const USAGE: &str = "\
usage:
  opf render <opf-dir> <work> [--format md|tei] [--layers A,B,...]
  opf rebase <old.txt> <new.txt> <layer.yml> [--context N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Tei,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Render {
        opf: PathBuf,
        work: String,
        format: Format,
        layers: LayerSelection,
    },
    Rebase {
        old: PathBuf,
        new: PathBuf,
        layer: PathBuf,
        context_len: Option<usize>,
    },
}

fn split_flags(args: &[String]) -> Result<(Vec<&str>, Vec<(&str, &str)>), String> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--") {
            let value = iter
                .next()
                .ok_or_else(|| format!("missing value for --{name}"))?;
            flags.push((name, value.as_str()));
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((positional, flags))
}

pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some((command, rest)) = args.split_first() else {
        return Err("missing command".to_string());
    };
    let (positional, flags) = split_flags(rest)?;

    match (command.as_str(), positional.as_slice()) {
        ("render", [opf, work]) => {
            let mut format = Format::Markdown;
            let mut layers = LayerSelection::All;
            for (name, value) in flags {
                match name {
                    "format" => {
                        format = match value {
                            "md" | "markdown" => Format::Markdown,
                            "tei" => Format::Tei,
                            other => return Err(format!("unknown format '{other}'")),
                        }
                    }
                    "layers" => {
                        layers = LayerSelection::Only(
                            value
                                .split(',')
                                .map(str::trim)
                                .filter(|l| !l.is_empty())
                                .map(LayerId::new)
                                .collect(),
                        )
                    }
                    other => return Err(format!("unknown option --{other}")),
                }
            }
            Ok(Command::Render {
                opf: PathBuf::from(opf),
                work: work.to_string(),
                format,
                layers,
            })
        }
        ("rebase", [old, new, layer]) => {
            let mut context_len = None;
            for (name, value) in flags {
                match name {
                    "context" => {
                        context_len = Some(
                            value
                                .parse()
                                .map_err(|_| format!("invalid context length '{value}'"))?,
                        )
                    }
                    other => return Err(format!("unknown option --{other}")),
                }
            }
            Ok(Command::Rebase {
                old: PathBuf::from(old),
                new: PathBuf::from(new),
                layer: PathBuf::from(layer),
                context_len,
            })
        }
        ("render" | "rebase", _) => Err(format!("wrong number of arguments for '{command}'")),
        (other, _) => Err(format!("unknown command '{other}'")),
    }
}
