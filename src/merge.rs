//! Relational merge of the three feature sets into ordered per-event records.

use std::collections::HashMap;

use crate::records::{HitFeature, MergedRecord, SpectralFeature, WaveformDescriptor};

/// Join waveform descriptors and hit features on event id, then optionally
/// left-join spectral features.
///
/// The inner join drops ids present on only one side: waveform-only or
/// hit-only ids are considered inconsistent entries and excluded. The left
/// join keeps every merged id; unmatched ids retain `None` spectral fields.
/// Output order is the ascending event-id order of the descriptor sequence.
pub fn merge_records(
    descriptors: &[WaveformDescriptor],
    hits: &[HitFeature],
    spectral: Option<&[SpectralFeature]>,
) -> Vec<MergedRecord> {
    let hits_by_id: HashMap<i64, &HitFeature> =
        hits.iter().map(|h| (h.event_id, h)).collect();
    let spectral_by_id: HashMap<i64, &SpectralFeature> = spectral
        .unwrap_or_default()
        .iter()
        .map(|s| (s.event_id, s))
        .collect();

    descriptors
        .iter()
        .filter_map(|descriptor| {
            let hit = hits_by_id.get(&descriptor.event_id)?;
            let mut record = MergedRecord::new(descriptor, hit);
            if let Some(spectral) = spectral_by_id.get(&descriptor.event_id) {
                record.peak_freq_khz = spectral.peak_freq_khz;
                record.centroid_freq_khz = spectral.centroid_freq_khz;
            }
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(event_id: i64) -> WaveformDescriptor {
        WaveformDescriptor {
            event_id,
            time_tick: Some(event_id * 100),
            channel: 1,
            sample_count: 64,
            sample_rate: 1_000_000,
        }
    }

    fn hit(event_id: i64) -> HitFeature {
        HitFeature {
            event_id,
            channel: 1,
            amplitude: 0.01,
            duration: 10.0,
            energy: 1.0,
            rms: 0.001,
            counts: 5,
            rise_time: 2.0,
        }
    }

    fn spectral(event_id: i64) -> SpectralFeature {
        SpectralFeature {
            event_id,
            peak_freq_khz: Some(150.0),
            centroid_freq_khz: Some(210.0),
        }
    }

    #[test]
    fn test_inner_join_keeps_only_intersection() {
        let descriptors = vec![descriptor(1), descriptor(2), descriptor(4)];
        let hits = vec![hit(1), hit(2), hit(3)];
        let merged = merge_records(&descriptors, &hits, None);
        let ids: Vec<i64> = merged.iter().map(|r| r.event_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_output_follows_descriptor_order() {
        let descriptors = vec![descriptor(1), descriptor(5), descriptor(9)];
        let hits = vec![hit(9), hit(1), hit(5)];
        let merged = merge_records(&descriptors, &hits, None);
        let ids: Vec<i64> = merged.iter().map(|r| r.event_id).collect();
        assert_eq!(ids, vec![1, 5, 9]);
    }

    #[test]
    fn test_left_join_keeps_unmatched_ids_with_null_spectral() {
        let descriptors = vec![descriptor(1), descriptor(2)];
        let hits = vec![hit(1), hit(2)];
        let spectral_rows = vec![spectral(1)];
        let merged = merge_records(&descriptors, &hits, Some(&spectral_rows));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].peak_freq_khz, Some(150.0));
        assert_eq!(merged[0].centroid_freq_khz, Some(210.0));
        assert_eq!(merged[1].peak_freq_khz, None);
        assert_eq!(merged[1].centroid_freq_khz, None);
    }

    #[test]
    fn test_no_spectral_source_leaves_fields_empty() {
        let merged = merge_records(&[descriptor(1)], &[hit(1)], None);
        assert_eq!(merged[0].peak_freq_khz, None);
        assert_eq!(merged[0].centroid_freq_khz, None);
    }
}
