//! The static rendition ladder and tier selection.

/// One resolution+bitrate encoding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionSpec {
    pub label: &'static str,
    pub target_width: u32,
    pub target_height: u32,
    pub bitrate_kbps: u32,
}

/// Candidate tiers in ascending bitrate order. The master playlist lists
/// variants in this order.
pub const RENDITION_LADDER: [RenditionSpec; 4] = [
    RenditionSpec {
        label: "360p",
        target_width: 640,
        target_height: 360,
        bitrate_kbps: 800,
    },
    RenditionSpec {
        label: "480p",
        target_width: 854,
        target_height: 480,
        bitrate_kbps: 1400,
    },
    RenditionSpec {
        label: "720p",
        target_width: 1280,
        target_height: 720,
        bitrate_kbps: 2800,
    },
    RenditionSpec {
        label: "1080p",
        target_width: 1920,
        target_height: 1080,
        bitrate_kbps: 5000,
    },
];

/// Segment length handed to the encoder.
pub const SEGMENT_SECONDS: u32 = 4;
/// Fixed GOP / keyframe interval so segment boundaries stay aligned.
pub const KEYFRAME_INTERVAL: u32 = 48;

impl RenditionSpec {
    /// Playlist bandwidth in bits per second.
    pub fn bandwidth_bps(&self) -> u64 {
        self.bitrate_kbps as u64 * 1000
    }

    /// Padded output resolution as `WIDTHxHEIGHT`.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.target_width, self.target_height)
    }

    pub fn variant_playlist_filename(&self) -> String {
        format!("{}.m3u8", self.label)
    }

    /// Segment filename pattern passed to the encoder.
    pub fn segment_filename_pattern(&self) -> String {
        format!("{}_%03d.ts", self.label)
    }
}

/// A tier is eligible only if the source covers it in both dimensions.
/// Upscaling wastes storage and bandwidth without quality gain, so a source
/// smaller than the lowest tier yields an empty selection; that is a valid
/// terminal outcome, not an error.
pub fn select_tiers(source_width: u32, source_height: u32) -> Vec<RenditionSpec> {
    RENDITION_LADDER
        .iter()
        .copied()
        .filter(|tier| tier.target_width <= source_width && tier.target_height <= source_height)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sd_source_selects_only_lowest_tier() {
        let tiers = select_tiers(640, 360);
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].label, "360p");
    }

    #[test]
    fn full_hd_source_selects_all_tiers() {
        let tiers = select_tiers(1920, 1080);
        assert_eq!(tiers.len(), 4);
        let labels: Vec<_> = tiers.iter().map(|t| t.label).collect();
        assert_eq!(labels, ["360p", "480p", "720p", "1080p"]);
    }

    #[test]
    fn both_dimensions_must_cover_the_tier() {
        // Wide but short: 480p needs 854x480, height disqualifies it.
        let tiers = select_tiers(1920, 360);
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].label, "360p");
    }

    #[test]
    fn tiny_source_selects_nothing() {
        assert!(select_tiers(320, 240).is_empty());
    }

    #[test]
    fn selection_preserves_ascending_bitrate_order() {
        let tiers = select_tiers(4096, 2160);
        let bitrates: Vec<_> = tiers.iter().map(|t| t.bitrate_kbps).collect();
        let mut sorted = bitrates.clone();
        sorted.sort_unstable();
        assert_eq!(bitrates, sorted);
    }

    #[test]
    fn selection_is_pure() {
        assert_eq!(select_tiers(1280, 720), select_tiers(1280, 720));
    }

    #[test]
    fn bandwidth_has_no_remainder_loss() {
        for tier in RENDITION_LADDER {
            assert_eq!(tier.bandwidth_bps(), tier.bitrate_kbps as u64 * 1000);
            assert_eq!(tier.bandwidth_bps() % 1000, 0);
        }
    }
}
