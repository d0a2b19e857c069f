//! Deterministic output file names.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::encode::OutputFormat;

/// How output files are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NamingMode {
    /// `cropped_<stem>.<ext>`
    #[default]
    KeepOriginal,
    /// `<prefix>, <n>.<ext>` numbered from 1 in input order
    Sequential { prefix: String },
    /// `<stem><suffix>.<ext>`
    Suffixed { suffix: String },
}

/// Assigns output names.
pub struct Namer;

impl Namer {
    /// Name the output at position `index` (0-based) of a batch.
    ///
    /// An empty or whitespace-only sequential prefix falls back to
    /// [`NamingMode::KeepOriginal`].
    pub fn name(index: usize, original: &str, mode: &NamingMode, format: OutputFormat) -> String {
        let ext = format.extension();
        match mode {
            NamingMode::Sequential { prefix } if !prefix.trim().is_empty() => {
                format!("{}, {}.{}", prefix, index + 1, ext)
            }
            NamingMode::Suffixed { suffix } => format!("{}{}.{}", stem(original), suffix, ext),
            NamingMode::KeepOriginal | NamingMode::Sequential { .. } => {
                format!("cropped_{}.{}", stem(original), ext)
            }
        }
    }

    /// Make every name unique, keeping the first occurrence as is.
    ///
    /// Later duplicates get `_2`, `_3`, ... before the extension, skipping any
    /// candidate that is already taken.
    pub fn disambiguate(names: Vec<String>) -> Vec<String> {
        let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
        let mut out = Vec::with_capacity(names.len());

        for name in names {
            if taken.insert(name.clone()) {
                out.push(name);
                continue;
            }
            let (base, ext) = split_extension(&name);
            let mut n = 2usize;
            let unique = loop {
                let candidate = match ext {
                    Some(ext) => format!("{base}_{n}.{ext}"),
                    None => format!("{base}_{n}"),
                };
                if !taken.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            tracing::debug!("Renamed duplicate output {:?} to {:?}", name, unique);
            taken.insert(unique.clone());
            out.push(unique);
        }
        out
    }
}

/// File name without its last extension. Directory components are dropped.
pub fn stem(name: &str) -> &str {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    split_extension(file).0
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => (base, Some(ext)),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_original() {
        let name = Namer::name(0, "product.png", &NamingMode::KeepOriginal, OutputFormat::WebP);
        assert_eq!(name, "cropped_product.webp");
    }

    #[test]
    fn test_sequential_numbers_from_one() {
        let mode = NamingMode::Sequential {
            prefix: "AE2010R".to_string(),
        };
        let names: Vec<String> = ["c.png", "a.png", "b.png"]
            .iter()
            .enumerate()
            .map(|(i, original)| Namer::name(i, original, &mode, OutputFormat::WebP))
            .collect();
        assert_eq!(
            names,
            vec!["AE2010R, 1.webp", "AE2010R, 2.webp", "AE2010R, 3.webp"]
        );
    }

    #[test]
    fn test_empty_prefix_falls_back() {
        let mode = NamingMode::Sequential {
            prefix: "  ".to_string(),
        };
        assert_eq!(
            Namer::name(4, "x.jpeg", &mode, OutputFormat::Png),
            "cropped_x.png"
        );
    }

    #[test]
    fn test_sequential_prefix_used_verbatim() {
        let mode = NamingMode::Sequential {
            prefix: " AE 2010 ".to_string(),
        };
        assert_eq!(
            Namer::name(0, "a.png", &mode, OutputFormat::Png),
            " AE 2010 , 1.png"
        );
    }

    #[test]
    fn test_suffixed() {
        let mode = NamingMode::Suffixed {
            suffix: "_250x250".to_string(),
        };
        assert_eq!(
            Namer::name(0, "lamp.tiff", &mode, OutputFormat::Jpeg),
            "lamp_250x250.jpg"
        );
    }

    #[test]
    fn test_stem_strips_last_extension_only() {
        assert_eq!(stem("a.b.png"), "a.b");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem(".hidden"), ".hidden");
        assert_eq!(stem("dir/sub/file.webp"), "file");
    }

    #[test]
    fn test_disambiguate() {
        let names = vec![
            "cropped_a.webp".to_string(),
            "cropped_a.webp".to_string(),
            "cropped_a_2.webp".to_string(),
            "cropped_a.webp".to_string(),
            "cropped_b.webp".to_string(),
        ];
        assert_eq!(
            Namer::disambiguate(names),
            vec![
                "cropped_a.webp",
                "cropped_a_2.webp",
                "cropped_a_2_2.webp",
                "cropped_a_3.webp",
                "cropped_b.webp",
            ]
        );
    }

    #[test]
    fn test_naming_mode_serde() {
        let mode: NamingMode = serde_json::from_str(r#"{"mode":"keep_original"}"#).unwrap();
        assert_eq!(mode, NamingMode::KeepOriginal);
        let json = serde_json::to_string(&NamingMode::Sequential {
            prefix: "X".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"mode":"sequential","prefix":"X"}"#);
    }
}
