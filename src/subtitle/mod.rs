//! WebVTT to SRT conversion.
//!
//! Pure text-to-text: the caller reads and writes files. Conversion is
//! tolerant: cue blocks with an unparseable timestamp line are dropped with
//! a warning rather than failing the whole file.

use std::fmt;

/// Millisecond offset displayed in SRT form (`HH:MM:SS,mmm`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SrtTimestamp(pub u64);

impl fmt::Display for SrtTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ms = self.0;
        let hours = ms / 3_600_000;
        ms %= 3_600_000;
        let minutes = ms / 60_000;
        ms %= 60_000;
        let seconds = ms / 1_000;
        ms %= 1_000;
        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, ms)
    }
}

impl SrtTimestamp {
    /// Parse a WebVTT timestamp (`HH:MM:SS.mmm`, hours optional)
    pub fn parse_vtt(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        let (hours, minutes, rest) = match parts.as_slice() {
            [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
            [m, s] => (0, m.parse::<u64>().ok()?, *s),
            _ => return None,
        };

        let (seconds, millis) = rest.split_once('.')?;
        let seconds = seconds.parse::<u64>().ok()?;
        if millis.len() != 3 {
            return None;
        }
        let millis = millis.parse::<u64>().ok()?;

        if minutes > 59 || seconds > 59 {
            return None;
        }

        Some(SrtTimestamp(
            hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis,
        ))
    }
}

/// One timed subtitle entry. The index is assigned at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    pub start: SrtTimestamp,
    pub end: SrtTimestamp,
    pub text: Vec<String>,
}

/// Convert WebVTT text to SRT text.
///
/// Strips the `WEBVTT` header, `NOTE`/`STYLE`/`REGION` blocks and inline
/// markup tags, discards cue settings and source cue identifiers, and
/// re-numbers cues 1-based in source order. Overlapping cues and cues with
/// empty text pass through unchanged. Deterministic: the same input always
/// produces byte-identical output.
pub fn vtt_to_srt(source: &str) -> String {
    let cues = parse_cues(source);

    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        out.push_str(&format!("{}\n{} --> {}\n", i + 1, cue.start, cue.end));
        if cue.text.is_empty() {
            out.push('\n');
        } else {
            for line in &cue.text {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
    }

    out
}

/// Parse a WebVTT document into cues, skipping non-cue blocks and dropping
/// malformed cue blocks with a warning.
pub fn parse_cues(source: &str) -> Vec<SubtitleCue> {
    // WebVTT counts whitespace-only lines as blank, so blank them out before
    // splitting on the double newline between blocks.
    let normalized: String = source
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|l| if l.trim().is_empty() { "" } else { l })
        .collect::<Vec<_>>()
        .join("\n");

    let mut cues = Vec::new();
    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim_end)
            .skip_while(|l| l.is_empty())
            .collect();
        if lines.is_empty() {
            continue;
        }

        // Header and metadata blocks carry no cue content
        let first = lines[0].trim_start();
        if first.starts_with("WEBVTT")
            || first.starts_with("NOTE")
            || first.starts_with("STYLE")
            || first.starts_with("REGION")
        {
            continue;
        }

        match parse_cue_block(&lines) {
            Some(cue) => cues.push(cue),
            None => {
                tracing::warn!("Dropping malformed cue block: {:?}", lines.first());
            }
        }
    }

    cues
}

fn parse_cue_block(lines: &[&str]) -> Option<SubtitleCue> {
    // An optional cue identifier may precede the timestamp line
    let timing_idx = lines.iter().position(|l| l.contains("-->"))?;
    if timing_idx > 1 {
        return None;
    }

    let (start, end) = parse_timing_line(lines[timing_idx])?;
    if start > end {
        return None;
    }

    let text = lines[timing_idx + 1..]
        .iter()
        .map(|l| strip_tags(l))
        .collect();

    Some(SubtitleCue { start, end, text })
}

fn parse_timing_line(line: &str) -> Option<(SrtTimestamp, SrtTimestamp)> {
    let (start_raw, rest) = line.split_once("-->")?;
    // Cue settings (position, alignment, ...) follow the end timestamp
    let end_raw = rest.trim().split_whitespace().next()?;

    let start = SrtTimestamp::parse_vtt(start_raw)?;
    let end = SrtTimestamp::parse_vtt(end_raw)?;
    Some((start, end))
}

/// Remove inline markup like `<b>`, `<c.color>` and `<00:00:01.000>`
fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
