//! Single-pass ingestion of the producer's line-oriented log format.
//!
//! Each physical line is trimmed and classified: blank lines are skipped,
//! `#` lines are metadata (recognized heads are parsed, anything else is a
//! forward-compatible annotation and is ignored), and every other line is a
//! comma-separated data record whose second field selects the record type.
//! Parsing is deterministic and stateless across calls; a structurally
//! invalid line aborts the whole load so a corrupted log can never yield a
//! silently truncated model.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ordered_float::NotNan;

use crate::core::model::{SimulationModel, Trajectory};
use crate::core::record::{
    BoxDimensions, CollisionEvent, CollisionKind, Obstacle, ParticleId, TrajectorySample,
    BOX_HEAD, COMMENT_MARKER, OBSTACLE_HEAD, POSITION_TAG,
};
use crate::error::{Error, Result};

/// One classified data-bearing line.
#[derive(Debug, Clone, PartialEq)]
enum Record {
    /// `# BOX: WxH`; restatements overwrite, last one wins.
    Box(BoxDimensions),
    /// `# OBSTACLE: x,y,side`, appended in file order.
    Obstacle(Obstacle),
    /// `t,POSITION,id,x,y,radius,mass`.
    Position {
        id: ParticleId,
        sample: TrajectorySample,
    },
    /// `t,<COLLISION_KIND>,fields...` with the fields kept verbatim.
    Collision(CollisionEvent),
}

/// Parse a whole log from any buffered reader into a fresh model.
///
/// Lines are not required to be time-ordered across particles; the frame
/// timeline is finalized sorted and duplicate-free after the stream ends.
/// Within one particle the producer contract requires strictly increasing
/// sample times, and a violation is rejected as [`Error::Format`].
///
/// Errors: [`Error::Format`] on any structurally invalid line (no partial
/// model is returned), [`Error::Io`] if reading fails.
pub fn parse<R: BufRead>(reader: R) -> Result<SimulationModel> {
    let mut box_dims: Option<BoxDimensions> = None;
    let mut obstacles: Vec<Obstacle> = Vec::new();
    let mut trajectories: BTreeMap<ParticleId, Trajectory> = BTreeMap::new();
    let mut times: BTreeSet<NotNan<f64>> = BTreeSet::new();
    let mut collisions: Vec<CollisionEvent> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let number = index + 1;
        let line = line?;
        let trimmed = line.trim();
        let Some(record) = classify(trimmed, number)? else {
            continue;
        };
        match record {
            Record::Box(dims) => box_dims = Some(dims),
            Record::Obstacle(obstacle) => obstacles.push(obstacle),
            Record::Position { id, sample } => {
                let trajectory = trajectories.entry(id).or_default();
                if let Some(last) = trajectory.last() {
                    if sample.time <= last.time {
                        return Err(malformed(
                            number,
                            trimmed,
                            format!(
                                "sample time {} does not increase past {} for particle {id}",
                                sample.time, last.time
                            ),
                        ));
                    }
                }
                // classify() only passes finite times through.
                let key = NotNan::new(sample.time)
                    .map_err(|_| malformed(number, trimmed, "time must be a number"))?;
                times.insert(key);
                trajectory.push(sample);
            }
            Record::Collision(event) => collisions.push(event),
        }
    }

    let timeline: Vec<f64> = times.into_iter().map(NotNan::into_inner).collect();
    let model = SimulationModel::from_parts(
        box_dims.unwrap_or_default(),
        obstacles,
        trajectories,
        timeline,
        collisions,
    );
    log::info!(
        "loaded {} particles, {} frames, {} collisions",
        model.num_particles(),
        model.frame_count(),
        model.collisions().len()
    );
    Ok(model)
}

/// Parse a log held in memory (used heavily by tests).
pub fn parse_str(text: &str) -> Result<SimulationModel> {
    parse(text.as_bytes())
}

/// Open `path` and parse it. The handle is scope-bound and released on
/// every exit path, including parse failure.
pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<SimulationModel> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

/// Classify one trimmed line; `Ok(None)` for blanks and for comments that
/// carry no recognized metadata head.
fn classify(line: &str, number: usize) -> Result<Option<Record>> {
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(comment) = line.strip_prefix(COMMENT_MARKER) {
        return classify_comment(comment.trim_start(), line, number);
    }
    classify_data(line, number).map(Some)
}

/// Metadata lines. Only `BOX:` and `OBSTACLE:` heads are meaningful; a
/// recognized head with a malformed payload is fatal, while unknown
/// comments (`# DT: 0.01`, free-text banners) are producer annotations and
/// are skipped.
fn classify_comment(comment: &str, raw: &str, number: usize) -> Result<Option<Record>> {
    if let Some(dims) = comment.strip_prefix(BOX_HEAD) {
        let (w, h) = dims
            .split_once('x')
            .ok_or_else(|| malformed(number, raw, "box size must be <width>x<height>"))?;
        let width = positive(number, raw, w, "box width")?;
        let height = positive(number, raw, h, "box height")?;
        return Ok(Some(Record::Box(BoxDimensions { width, height })));
    }
    if let Some(coords) = comment.strip_prefix(OBSTACLE_HEAD) {
        let fields: Vec<&str> = coords.split(',').collect();
        if fields.len() != 3 {
            return Err(malformed(number, raw, "obstacle must be <x>,<y>,<side>"));
        }
        let x = numeric(number, raw, fields[0], "obstacle x")?;
        let y = numeric(number, raw, fields[1], "obstacle y")?;
        let side = positive(number, raw, fields[2], "obstacle side")?;
        return Ok(Some(Record::Obstacle(Obstacle { x, y, side })));
    }
    Ok(None)
}

/// Data records: `<time>,<tag>,fields...`.
fn classify_data(line: &str, number: usize) -> Result<Record> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return Err(malformed(number, line, "data record needs a time and a tag"));
    }
    let time = numeric(number, line, fields[0], "time")?;
    let tag = fields[1].trim();

    if tag == POSITION_TAG {
        if fields.len() != 7 {
            return Err(malformed(
                number,
                line,
                format!("POSITION record must have 7 fields, found {}", fields.len()),
            ));
        }
        let id: ParticleId = fields[2].trim().parse().map_err(|_| {
            malformed(number, line, "particle id must be an unsigned integer")
        })?;
        let x = numeric(number, line, fields[3], "x")?;
        let y = numeric(number, line, fields[4], "y")?;
        let radius = positive(number, line, fields[5], "radius")?;
        let mass = positive(number, line, fields[6], "mass")?;
        return Ok(Record::Position {
            id,
            sample: TrajectorySample {
                time,
                x,
                y,
                radius,
                mass,
            },
        });
    }

    match CollisionKind::from_tag(tag) {
        Some(kind) => Ok(Record::Collision(CollisionEvent {
            time,
            kind,
            // Verbatim: downstream consumers own the kind-specific arity.
            payload: fields[2..].iter().map(|f| f.to_string()).collect(),
        })),
        None => Err(malformed(
            number,
            line,
            format!("unknown record tag `{tag}`"),
        )),
    }
}

fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Error {
    Error::Format {
        line,
        content: content.to_string(),
        reason: reason.into(),
    }
}

/// Parse one field as a finite f64. Fields may carry incidental spacing
/// (the producer writes `# BOX: 100 x 100`), so the field is trimmed first.
fn numeric(line: usize, raw: &str, field: &str, what: &str) -> Result<f64> {
    let value: f64 = field
        .trim()
        .parse()
        .map_err(|_| malformed(line, raw, format!("{what} must be a number")))?;
    if !value.is_finite() {
        return Err(malformed(line, raw, format!("{what} must be finite")));
    }
    Ok(value)
}

fn positive(line: usize, raw: &str, field: &str, what: &str) -> Result<f64> {
    let value = numeric(line, raw, field, what)?;
    if value <= 0.0 {
        return Err(malformed(line, raw, format!("{what} must be > 0")));
    }
    Ok(value)
}
