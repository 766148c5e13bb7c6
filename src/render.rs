// SYNOID Hype Reel Renderer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Executes a CutPlan with FFmpeg: every segment is cut with stream copy,
// then the parts are joined through the concat demuxer in plan order. If
// the copy-concat fails (mismatched streams) the join is re-encoded.

use crate::engine::cut_plan::{CutPlan, SelectedSegment};
use crate::engine::signals::SourceDescriptor;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub output_path: PathBuf,
    pub segments: usize,
    pub seconds: f64,
    pub size_mb: f64,
}

pub struct ReelRenderer {
    work_dir: PathBuf,
}

impl ReelRenderer {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// FFmpeg arguments cutting one segment without re-encoding.
    pub fn cut_args(media: &Path, segment: &SelectedSegment, part: &Path) -> Vec<String> {
        let duration = segment.duration().max(0.01);
        vec![
            "-y".to_string(),
            "-nostdin".to_string(),
            "-ss".to_string(),
            format!("{:.3}", segment.start),
            "-i".to_string(),
            media.to_string_lossy().into_owned(),
            "-t".to_string(),
            format!("{:.3}", duration),
            "-c".to_string(),
            "copy".to_string(),
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            part.to_string_lossy().into_owned(),
        ]
    }

    /// One `file '<path>'` line per part, in the given order.
    pub fn concat_manifest(parts: &[PathBuf]) -> String {
        parts
            .iter()
            .map(|p| format!("file '{}'", p.to_string_lossy().replace('\'', "'\\''")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Media path for every source the plan touches.
    pub fn resolve_media(
        plan: &CutPlan,
        sources: &[SourceDescriptor],
    ) -> Result<HashMap<String, PathBuf>> {
        let mut media = HashMap::new();
        for id in plan.source_ids() {
            let path = sources
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| s.media_path.clone())
                .with_context(|| format!("No media_path for source '{}'", id))?;
            media.insert(id.to_string(), path);
        }
        Ok(media)
    }

    pub async fn render(
        &self,
        plan: &CutPlan,
        sources: &[SourceDescriptor],
        output: &Path,
    ) -> Result<RenderSummary> {
        if plan.is_empty() {
            bail!("Cut plan is empty; nothing to render.");
        }
        let media = Self::resolve_media(plan, sources)?;

        let parts_dir = self.work_dir.join("synoid_hype_parts");
        if parts_dir.exists() {
            fs::remove_dir_all(&parts_dir).context("Clearing previous parts dir")?;
        }
        fs::create_dir_all(&parts_dir).context("Creating parts dir")?;

        let stitched = self.cut_and_stitch(plan, &media, &parts_dir, output).await;
        if let Err(e) = fs::remove_dir_all(&parts_dir) {
            warn!("[RENDER] Could not remove {:?}: {}", parts_dir, e);
        }
        stitched?;

        let size_mb = fs::metadata(output)
            .map(|m| m.len() as f64 / 1_048_576.0)
            .unwrap_or(0.0);
        let summary = RenderSummary {
            output_path: output.to_path_buf(),
            segments: plan.len(),
            seconds: plan.total_duration(),
            size_mb,
        };
        info!(
            "[RENDER] Reel ready: {} segments, {:.1}s, {:.2} MB",
            summary.segments, summary.seconds, summary.size_mb
        );
        Ok(summary)
    }

    async fn cut_and_stitch(
        &self,
        plan: &CutPlan,
        media: &HashMap<String, PathBuf>,
        parts_dir: &Path,
        output: &Path,
    ) -> Result<()> {
        info!("[RENDER] Cutting {} segment(s)...", plan.len());
        let mut parts = Vec::with_capacity(plan.len());
        for (i, segment) in plan.iter().enumerate() {
            let part = parts_dir.join(format!("part_{:03}.mp4", i));
            let source_media = media
                .get(&segment.source_id)
                .with_context(|| format!("No media for source '{}'", segment.source_id))?;
            let result = Command::new("ffmpeg")
                .args(Self::cut_args(source_media, segment, &part))
                .output()
                .await
                .context("Failed to run ffmpeg for segment cut")?;
            if !result.status.success() {
                bail!(
                    "FFmpeg cut failed for {} {:.1}-{:.1}s: {}",
                    segment.source_id,
                    segment.start,
                    segment.end,
                    String::from_utf8_lossy(&result.stderr).trim()
                );
            }
            parts.push(part);
        }

        let manifest_path = parts_dir.join("concat_list.txt");
        fs::write(&manifest_path, Self::concat_manifest(&parts))
            .context("Writing concat manifest")?;

        info!("[RENDER] Stitching parts into {:?}", output);
        if !self.concat(&manifest_path, output, true).await? {
            warn!("[RENDER] Stream-copy concat failed, re-encoding");
            if !self.concat(&manifest_path, output, false).await? {
                error!("[RENDER] Re-encode concat failed");
                bail!("FFmpeg concat failed for {:?}", output);
            }
        }
        Ok(())
    }

    async fn concat(&self, manifest: &Path, output: &Path, stream_copy: bool) -> Result<bool> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-nostdin", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest);
        if stream_copy {
            cmd.args(["-c", "copy"]);
        } else {
            cmd.args([
                "-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-c:a", "aac", "-b:a",
                "128k",
            ]);
        }
        let result = cmd
            .arg(output)
            .output()
            .await
            .context("Failed to run ffmpeg concat")?;
        Ok(result.status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, start: f64, end: f64) -> SelectedSegment {
        SelectedSegment {
            source_id: id.to_string(),
            source_order: 0,
            start,
            end,
            score: 1.0,
        }
    }

    #[test]
    fn test_cut_args_seek_before_input() {
        let args = ReelRenderer::cut_args(
            Path::new("/vods/a.mp4"),
            &segment("a", 12.5, 42.5),
            Path::new("/tmp/part_000.mp4"),
        );
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "12.500");
        assert!(args.contains(&"30.000".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/part_000.mp4");
    }

    #[test]
    fn test_manifest_keeps_plan_order() {
        let parts = vec![
            PathBuf::from("/tmp/part_000.mp4"),
            PathBuf::from("/tmp/part_001.mp4"),
        ];
        let manifest = ReelRenderer::concat_manifest(&parts);
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines, vec!["file '/tmp/part_000.mp4'", "file '/tmp/part_001.mp4'"]);
        assert!(ReelRenderer::concat_manifest(&[]).is_empty());
    }

    #[test]
    fn test_resolve_media_requires_paths() {
        let plan = CutPlan::from_segments(vec![segment("a", 0.0, 5.0)]);
        let mut source = SourceDescriptor::new("a", 10.0);
        assert!(ReelRenderer::resolve_media(&plan, &[source.clone()]).is_err());

        source.media_path = Some(PathBuf::from("/vods/a.mp4"));
        let media = ReelRenderer::resolve_media(&plan, &[source]).unwrap();
        assert_eq!(media["a"], PathBuf::from("/vods/a.mp4"));
    }

    #[tokio::test]
    async fn test_render_empty_plan_fails_fast() {
        let renderer = ReelRenderer::new(std::env::temp_dir());
        let result = renderer
            .render(&CutPlan::default(), &[], Path::new("out.mp4"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_render_removes_parts_dir() {
        let work_dir = std::env::temp_dir().join("synoid_hype_render_cleanup");
        fs::create_dir_all(&work_dir).unwrap();
        let mut source = SourceDescriptor::new("a", 10.0);
        source.media_path = Some(work_dir.join("missing_vod.mp4"));
        let plan = CutPlan::from_segments(vec![segment("a", 0.0, 5.0)]);

        // Fails either because ffmpeg is absent or because the input is missing.
        let result = ReelRenderer::new(work_dir.clone())
            .render(&plan, &[source], &work_dir.join("reel.mp4"))
            .await;
        assert!(result.is_err());
        assert!(!work_dir.join("synoid_hype_parts").exists());

        let _ = fs::remove_dir_all(&work_dir);
    }
}
