use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{model::Music, Result};

/// Summary of every song processed in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    /// Seconds since the Unix epoch at generation time.
    pub last_updated: f64,
    pub musics: Vec<MusicSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicSummary {
    pub id: String,
    pub jacket: bool,
    pub tracks: Vec<String>,
    pub scores: Vec<String>,
}

impl From<&Music> for MusicSummary {
    fn from(music: &Music) -> Self {
        let mut tracks: Vec<String> = music.tracks.iter().map(|track| track.label()).collect();
        tracks.sort();

        let mut scores: Vec<String> = music
            .scores
            .iter()
            .map(|score| score.difficulty.clone())
            .collect();
        scores.sort();

        Self {
            id: music.id.clone(),
            jacket: music.jacket.is_found(),
            tracks,
            scores,
        }
    }
}

impl Manifest {
    /// Builds the manifest with songs ordered by id.
    pub fn build(name: impl Into<String>, musics: &[Music], generated_at: SystemTime) -> Self {
        let mut summaries: Vec<MusicSummary> = musics.iter().map(MusicSummary::from).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));

        let last_updated = generated_at
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();

        Self {
            name: name.into(),
            last_updated,
            musics: summaries,
        }
    }

    /// Pretty-prints the manifest with four-space indentation.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::DynamicImage;

    use super::*;
    use crate::model::{Jacket, Score, Track};

    fn music(id: &str, tracks: &[(&str, &str)], scores: &[&str]) -> Music {
        let mut music = Music::new(id);
        for (variant, track_id) in tracks {
            music.tracks.push(Track {
                song_id: id.to_string(),
                variant_tag: variant.to_string(),
                track_id: track_id.to_string(),
                audio: Vec::new(),
            });
        }
        for difficulty in scores {
            music.scores.push(Score {
                song_id: id.to_string(),
                difficulty: difficulty.to_string(),
                data: Vec::new(),
            });
        }
        music
    }

    #[test]
    fn songs_are_sorted_by_id() {
        let musics = vec![
            music("0200", &[("xx", "0200")], &[]),
            music("0012", &[("xx", "0012")], &[]),
            music("0100", &[("xx", "0100")], &[]),
        ];

        let manifest = Manifest::build("sekai-scores", &musics, UNIX_EPOCH);
        let ids: Vec<_> = manifest.musics.iter().map(|m| m.id.as_str()).collect();

        assert_eq!(ids, ["0012", "0100", "0200"]);
    }

    #[test]
    fn tracks_and_scores_are_sorted() {
        let musics = vec![music(
            "0012",
            &[("xx", "0012"), ("vs", "01"), ("se", "02")],
            &["master", "easy", "expert"],
        )];

        let manifest = Manifest::build("sekai-scores", &musics, UNIX_EPOCH);
        let summary = &manifest.musics[0];

        assert_eq!(summary.tracks, ["se_02", "vs_01", "xx_0012"]);
        assert_eq!(summary.scores, ["easy", "expert", "master"]);
        assert!(!summary.jacket);
    }

    #[test]
    fn jacket_flag_follows_found_jacket_even_after_release() {
        let mut song = music("0012", &[("xx", "0012")], &[]);
        song.jacket = Jacket::found(DynamicImage::new_rgb8(2, 2));
        song.release_payloads();

        let manifest = Manifest::build("sekai-scores", &[song], UNIX_EPOCH);
        assert!(manifest.musics[0].jacket);
    }

    #[test]
    fn identical_input_yields_identical_songs() {
        let musics = vec![
            music("0013", &[("xx", "0013")], &["hard"]),
            music("0012", &[("vs", "01")], &[]),
        ];

        let first = Manifest::build("sekai-scores", &musics, UNIX_EPOCH);
        let second = Manifest::build("sekai-scores", &musics, UNIX_EPOCH + Duration::from_secs(60));

        assert_eq!(first.musics, second.musics);
        assert_eq!(second.last_updated, 60.0);
    }

    #[test]
    fn json_uses_expected_shape() {
        let musics = vec![music("0012", &[("xx", "0012")], &[])];
        let manifest = Manifest::build("sekai-scores", &musics, UNIX_EPOCH + Duration::from_secs(5));

        let text = String::from_utf8(manifest.to_json().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["name"], "sekai-scores");
        assert_eq!(value["last_updated"], 5.0);
        assert_eq!(value["musics"][0]["id"], "0012");
        assert_eq!(value["musics"][0]["scores"], serde_json::json!([]));
        assert!(text.contains("\n    \"name\""));
    }
}
