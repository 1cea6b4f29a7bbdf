//! Standalone HTML export of a duplicate log.

use super::html::{escape, file_url};
use crate::core::duplicates::{DuplicateLog, MediaRecord};
use crate::error::ReportError;
use std::io::Write;
use std::path::Path;

/// How a member is labelled in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Delete,
    /// Group not resolved yet
    Candidate,
}

impl Verdict {
    /// Verdict for `member` in a group whose resolution state is `resolved`
    pub fn of(member: &MediaRecord, resolved: bool) -> Self {
        match (resolved, member.is_selected()) {
            (false, _) => Verdict::Candidate,
            (true, true) => Verdict::Keep,
            (true, false) => Verdict::Delete,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Verdict::Keep => "Keep",
            Verdict::Delete => "Delete",
            Verdict::Candidate => "Candidate",
        }
    }

    fn class(self) -> &'static str {
        match self {
            Verdict::Keep => "photo keep",
            Verdict::Delete => "photo delete",
            Verdict::Candidate => "photo",
        }
    }
}

/// Files the resolver has marked for deletion
fn marked_for_deletion(log: &DuplicateLog) -> usize {
    log.groups()
        .filter(|(_, group)| group.iter().any(MediaRecord::is_selected))
        .map(|(_, group)| group.iter().filter(|m| !m.is_selected()).count())
        .sum()
}

/// Export the log as a standalone HTML page
pub fn export_html<W: Write>(log: &DuplicateLog, mut writer: W, title: &str) -> std::io::Result<()> {
    let title = escape(title);
    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>
        :root {{
            --bg-primary: #0a0a0a;
            --bg-secondary: #1a1a1a;
            --bg-tertiary: #2a2a2a;
            --text-primary: #ffffff;
            --text-secondary: #a0a0a0;
            --accent: #3b82f6;
            --success: #22c55e;
            --danger: #ef4444;
        }}

        * {{ margin: 0; padding: 0; box-sizing: border-box; }}

        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
            padding: 2rem;
        }}

        .container {{ max-width: 1200px; margin: 0 auto; }}

        header {{
            text-align: center;
            margin-bottom: 2rem;
            padding-bottom: 1.5rem;
            border-bottom: 1px solid var(--bg-tertiary);
        }}

        .summary {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}

        .stat-card {{
            background: var(--bg-secondary);
            padding: 1.5rem;
            border-radius: 12px;
            text-align: center;
        }}

        .stat-value {{ font-size: 2rem; font-weight: bold; color: var(--accent); }}
        .stat-label {{ color: var(--text-secondary); font-size: 0.875rem; }}

        .group {{
            background: var(--bg-secondary);
            border-radius: 16px;
            margin-bottom: 1.5rem;
            overflow: hidden;
        }}

        .group-header {{
            padding: 1rem 1.5rem;
            background: var(--bg-tertiary);
            font-family: monospace;
        }}

        .photos {{
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
            gap: 1rem;
            padding: 1.5rem;
        }}

        .photo {{
            background: var(--bg-tertiary);
            border-radius: 8px;
            padding: 1rem;
            border: 2px solid transparent;
        }}

        .photo.keep {{ border-color: var(--success); }}
        .photo.delete {{ opacity: 0.6; }}

        .photo img {{
            width: 100%;
            height: 160px;
            object-fit: contain;
            background: var(--bg-primary);
            border-radius: 4px;
        }}

        .photo-path {{
            font-size: 0.75rem;
            color: var(--text-secondary);
            word-break: break-all;
            margin: 0.5rem 0;
        }}

        .photo-meta {{ font-size: 0.75rem; color: var(--text-secondary); }}

        .badge {{
            display: inline-block;
            padding: 0.125rem 0.5rem;
            border-radius: 4px;
            font-size: 0.625rem;
            text-transform: uppercase;
            margin-top: 0.5rem;
            background: var(--bg-secondary);
        }}

        .badge.keep {{ background: var(--success); color: white; }}
        .badge.delete {{ background: var(--danger); color: white; }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>{}</h1>
        </header>
"#,
        title, title
    )?;

    write!(
        writer,
        r#"
        <div class="summary">
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Duplicate Groups</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Files in Groups</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Marked for Deletion</div>
            </div>
        </div>
"#,
        log.len(),
        log.total_files(),
        marked_for_deletion(log)
    )?;

    for (fingerprint, group) in log.groups() {
        let resolved = group.iter().any(MediaRecord::is_selected);

        write!(
            writer,
            r#"
        <section class="group">
            <div class="group-header">{} &middot; {} files</div>
            <div class="photos">
"#,
            escape(fingerprint),
            group.len()
        )?;

        for member in group {
            let verdict = Verdict::of(member, resolved);
            let name = member.path.rsplit('/').next().unwrap_or(&member.path);
            let captured = member.capture_time.as_deref().unwrap_or("unknown");
            let linked = member
                .linked_video
                .as_deref()
                .map(|v| format!("<div>Live video: {}</div>", escape(v)))
                .unwrap_or_default();

            write!(
                writer,
                r#"
                <div class="{}">
                    <img src="{}" alt="{}" loading="lazy">
                    <div class="photo-path">{}</div>
                    <div class="photo-meta">
                        <div>{} &middot; {}</div>
                        <div>Captured: {}</div>
                        {}
                    </div>
                    <span class="badge {}">{}</span>
                </div>
"#,
                verdict.class(),
                escape(&file_url(&member.path)),
                escape(name),
                escape(&member.path),
                member.resolution,
                escape(&member.extension),
                escape(captured),
                linked,
                verdict.label().to_ascii_lowercase(),
                verdict.label()
            )?;
        }

        writeln!(writer, "            </div>\n        </section>")?;
    }

    write!(
        writer,
        r#"
    </div>
</body>
</html>
"#
    )?;

    Ok(())
}

/// Write the report to `path`, titled after the file stem
pub fn export_to_file(log: &DuplicateLog, path: &Path) -> Result<(), ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(io_error)?;
    let mut writer = std::io::BufWriter::new(file);
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Duplicate Report");

    export_html(log, &mut writer, title).map_err(io_error)?;
    writer.flush().map_err(io_error)
}
