use std::fs;
use std::path::PathBuf;

use rust_embed::Embed;

use crate::error::PoolError;
use crate::quiz::question::Question;

#[derive(Embed)]
#[folder = "assets/sets/"]
struct SetAssets;

/// A known question set: menu id, file name, display label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetInfo {
    pub id: &'static str,
    pub file: &'static str,
    pub label: &'static str,
}

pub const SET_CATALOG: &[SetInfo] = &[
    SetInfo {
        id: "1nen",
        file: "01.json",
        label: "Grade 1",
    },
    SetInfo {
        id: "2nen_1",
        file: "0201.json",
        label: "Grade 2 (part 1)",
    },
    SetInfo {
        id: "2nen_2",
        file: "0202.json",
        label: "Grade 2 (part 2)",
    },
    SetInfo {
        id: "3nen_1",
        file: "0301.json",
        label: "Grade 3 (part 1)",
    },
    SetInfo {
        id: "3nen_2",
        file: "0302.json",
        label: "Grade 3 (part 2)",
    },
    SetInfo {
        id: "4nen_1",
        file: "0401.json",
        label: "Grade 4 (part 1)",
    },
    SetInfo {
        id: "4nen_2",
        file: "0402.json",
        label: "Grade 4 (part 2)",
    },
    SetInfo {
        id: "5nen_1",
        file: "0501.json",
        label: "Grade 5 (part 1)",
    },
    SetInfo {
        id: "5nen_2",
        file: "0502.json",
        label: "Grade 5 (part 2)",
    },
    SetInfo {
        id: "6nen_1",
        file: "0601.json",
        label: "Grade 6 (part 1)",
    },
    SetInfo {
        id: "6nen_2",
        file: "0602.json",
        label: "Grade 6 (part 2)",
    },
];

/// File name for a set id; unknown ids map to `<id>.json`.
pub fn set_file_name(set_id: &str) -> String {
    SET_CATALOG
        .iter()
        .find(|s| s.id == set_id)
        .map(|s| s.file.to_string())
        .unwrap_or_else(|| format!("{set_id}.json"))
}

pub fn set_label(set_id: &str) -> String {
    SET_CATALOG
        .iter()
        .find(|s| s.id == set_id)
        .map(|s| s.label.to_string())
        .unwrap_or_else(|| set_id.to_string())
}

/// Catalog ids followed by any extra `*.json` sets found in `extra_dir`.
pub fn available_set_ids(extra_dir: Option<&PathBuf>) -> Vec<String> {
    let mut ids: Vec<String> = SET_CATALOG.iter().map(|s| s.id.to_string()).collect();
    let Some(dir) = extra_dir else {
        return ids;
    };
    let Ok(read_dir) = fs::read_dir(dir) else {
        return ids;
    };
    let mut extra: Vec<String> = read_dir
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let stem = name.strip_suffix(".json")?.to_string();
            let is_catalog_file = SET_CATALOG.iter().any(|s| s.file == name);
            (!is_catalog_file).then_some(stem)
        })
        .collect();
    extra.sort();
    for id in extra {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Parse a JSON array of question objects.
pub fn parse_questions(set_id: &str, json: &str) -> Result<Vec<Question>, PoolError> {
    let raw: Vec<Question> = serde_json::from_str(json)
        .map_err(|e| PoolError::unavailable(set_id, format!("malformed question data: {e}")))?;
    Ok(raw
        .into_iter()
        .map(Question::normalized)
        .filter(|q| !q.is_blank())
        .collect())
}

/// Anything that can turn a set id into question pairs.
pub trait QuestionSource {
    fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError>;
}

/// Sets bundled into the binary.
pub struct EmbeddedSource;

impl QuestionSource for EmbeddedSource {
    fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError> {
        let filename = set_file_name(set_id);
        let file = SetAssets::get(&filename)
            .ok_or_else(|| PoolError::unavailable(set_id, format!("{filename} is not bundled")))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| PoolError::unavailable(set_id, e))?;
        parse_questions(set_id, content)
    }
}

/// Sets stored as JSON files in a directory.
pub struct DirSource {
    base_dir: PathBuf,
}

impl DirSource {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

impl QuestionSource for DirSource {
    fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError> {
        let path = self.base_dir.join(set_file_name(set_id));
        let content = fs::read_to_string(&path)
            .map_err(|e| PoolError::unavailable(set_id, format!("{}: {e}", path.display())))?;
        parse_questions(set_id, &content)
    }
}

/// Sets fetched from `<base_url>/<file>`.
#[cfg(feature = "network")]
pub struct HttpSource {
    base_url: String,
}

#[cfg(feature = "network")]
impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(feature = "network")]
impl QuestionSource for HttpSource {
    fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError> {
        let url = format!("{}/{}", self.base_url, set_file_name(set_id));
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| PoolError::unavailable(set_id, e))?;
        let response = client
            .get(&url)
            .send()
            .map_err(|e| PoolError::unavailable(set_id, e))?;
        if !response.status().is_success() {
            return Err(PoolError::unavailable(
                set_id,
                format!("{url} returned {}", response.status()),
            ));
        }
        let body = response
            .text()
            .map_err(|e| PoolError::unavailable(set_id, e))?;
        parse_questions(set_id, &body)
    }
}

/// Tries each source in order; the first one that answers wins.
pub struct LayeredSource {
    layers: Vec<Box<dyn QuestionSource>>,
}

impl LayeredSource {
    pub fn new(layers: Vec<Box<dyn QuestionSource>>) -> Self {
        Self { layers }
    }

    /// User directory, then the optional URL, then the bundled sets.
    pub fn standard(sets_dir: PathBuf, sets_url: Option<&str>) -> Self {
        let mut layers: Vec<Box<dyn QuestionSource>> = vec![Box::new(DirSource::new(sets_dir))];
        push_http_layer(&mut layers, sets_url);
        layers.push(Box::new(EmbeddedSource));
        Self::new(layers)
    }
}

#[cfg(feature = "network")]
fn push_http_layer(layers: &mut Vec<Box<dyn QuestionSource>>, sets_url: Option<&str>) {
    if let Some(url) = sets_url {
        layers.push(Box::new(HttpSource::new(url)));
    }
}

#[cfg(not(feature = "network"))]
fn push_http_layer(_layers: &mut Vec<Box<dyn QuestionSource>>, sets_url: Option<&str>) {
    if sets_url.is_some() {
        log::warn!("sets_url ignored: built without the network feature");
    }
}

impl QuestionSource for LayeredSource {
    fn fetch(&self, set_id: &str) -> Result<Vec<Question>, PoolError> {
        let mut last_err = PoolError::unavailable(set_id, "no question sources configured");
        for layer in &self.layers {
            match layer.fetch(set_id) {
                Ok(questions) => return Ok(questions),
                Err(e) => {
                    log::debug!("question source skipped for {set_id}: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}
