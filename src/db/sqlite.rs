//! SQLite realization of the event database readers.
//!
//! The Vallen databases are plain SQLite files. The waveform database keeps
//! one `tr_data` row per transient plus a `tr_globalinfo` key/value table;
//! the hit database exposes its features through `view_ae_data`; the
//! frequency database keeps one `trf_data` row per analyzed event.
//!
//! The proprietary transient blob encoding is out of scope here: `Data` is
//! read as little-endian f32 volts, and the time axis is derived from the
//! sample index and `SampleRate`.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::db::{HitReader, SpectralReader, WaveformReader, WaveformSamples};
use crate::error::{ReadFailure, Result};
use crate::records::{HitFeature, SpectralFeature, WaveformDescriptor};

fn open_read_only(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Reader over a `.tradb` transient waveform database.
pub struct SqliteWaveformDb {
    conn: Connection,
}

impl SqliteWaveformDb {
    /// Open the database read-only. The connection is released when the
    /// reader is dropped at the end of its stage.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(SqliteWaveformDb {
            conn: open_read_only(path)?,
        })
    }

    fn decode_samples(
        event_id: i64,
        data: Option<Vec<u8>>,
        sample_rate: i64,
    ) -> std::result::Result<WaveformSamples, ReadFailure> {
        let data = data.ok_or(ReadFailure::NoData(event_id))?;
        if data.is_empty() {
            return Err(ReadFailure::NoData(event_id));
        }
        if data.len() % 4 != 0 {
            return Err(ReadFailure::Malformed {
                event_id,
                reason: format!("blob length {} is not a multiple of 4", data.len()),
            });
        }
        if sample_rate <= 0 {
            return Err(ReadFailure::Malformed {
                event_id,
                reason: format!("non-positive sample rate {sample_rate}"),
            });
        }
        let amplitude_v: Vec<f64> = data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect();
        let time_s = (0..amplitude_v.len())
            .map(|i| i as f64 / sample_rate as f64)
            .collect();
        Ok(WaveformSamples { time_s, amplitude_v })
    }
}

impl WaveformReader for SqliteWaveformDb {
    fn read_descriptors(&mut self) -> Result<Vec<WaveformDescriptor>> {
        let mut stmt = self.conn.prepare(
            "SELECT TRAI, Time, Chan, Samples, SampleRate FROM tr_data \
             WHERE TRAI IS NOT NULL ORDER BY TRAI",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WaveformDescriptor {
                event_id: row.get(0)?,
                time_tick: row.get(1)?,
                channel: row.get(2)?,
                sample_count: row.get(3)?,
                sample_rate: row.get(4)?,
            })
        })?;
        let descriptors = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(descriptors)
    }

    fn time_base(&mut self) -> Result<i64> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT Value FROM tr_globalinfo WHERE Key = 'TimeBase'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or(1))
    }

    fn read_waveform(&mut self, event_id: i64) -> std::result::Result<WaveformSamples, ReadFailure> {
        let row: Option<(Option<Vec<u8>>, i64)> = self
            .conn
            .query_row(
                "SELECT Data, SampleRate FROM tr_data WHERE TRAI = ?1",
                [event_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|source| ReadFailure::Database { event_id, source })?;
        match row {
            None => Err(ReadFailure::NoData(event_id)),
            Some((data, sample_rate)) => Self::decode_samples(event_id, data, sample_rate),
        }
    }
}

/// Reader over a `.pridb` hit/feature database.
pub struct SqliteHitDb {
    conn: Connection,
}

impl SqliteHitDb {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(SqliteHitDb {
            conn: open_read_only(path)?,
        })
    }
}

impl HitReader for SqliteHitDb {
    fn read_hits(&mut self) -> Result<Vec<HitFeature>> {
        let mut stmt = self.conn.prepare(
            "SELECT TRAI, Chan, Amp, Dur, Eny, RMS, CTP, RiseT FROM view_ae_data \
             WHERE TRAI IS NOT NULL ORDER BY TRAI",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(HitFeature {
                event_id: row.get(0)?,
                channel: row.get(1)?,
                amplitude: row.get(2)?,
                duration: row.get(3)?,
                energy: row.get(4)?,
                rms: row.get(5)?,
                counts: row.get(6)?,
                rise_time: row.get(7)?,
            })
        })?;
        let hits = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(hits)
    }
}

/// Reader over a `.trfdb` frequency-domain database.
pub struct SqliteSpectralDb {
    conn: Connection,
}

impl SqliteSpectralDb {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(SqliteSpectralDb {
            conn: open_read_only(path)?,
        })
    }
}

impl SpectralReader for SqliteSpectralDb {
    fn read_spectral(&mut self) -> Result<Vec<SpectralFeature>> {
        let mut stmt = self.conn.prepare(
            "SELECT TRAI, FFT_FoM, FFT_CoG FROM trf_data \
             WHERE TRAI IS NOT NULL ORDER BY TRAI",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SpectralFeature {
                event_id: row.get(0)?,
                peak_freq_khz: row.get(1)?,
                centroid_freq_khz: row.get(2)?,
            })
        })?;
        let spectral = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(spectral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_tradb(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE tr_data (
                TRAI INTEGER, Time INTEGER, Chan INTEGER,
                Samples INTEGER, SampleRate INTEGER, Data BLOB
            );
            CREATE TABLE tr_globalinfo (Key TEXT, Value INTEGER);",
        )
        .unwrap();
    }

    fn samples_blob(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_descriptors_ordered_by_event_id() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        conn.execute(
            "INSERT INTO tr_data VALUES (3, 30, 1, 2, 1000000, NULL), (1, 10, 1, 2, 1000000, NULL)",
            [],
        )
        .unwrap();
        let mut db = SqliteWaveformDb { conn };
        let descriptors = db.read_descriptors().unwrap();
        let ids: Vec<i64> = descriptors.iter().map(|d| d.event_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(descriptors[0].time_tick, Some(10));
    }

    #[test]
    fn test_time_base_defaults_to_one() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        let mut db = SqliteWaveformDb { conn };
        assert_eq!(db.time_base().unwrap(), 1);

        db.conn
            .execute("INSERT INTO tr_globalinfo VALUES ('TimeBase', 10)", [])
            .unwrap();
        assert_eq!(db.time_base().unwrap(), 10);
    }

    #[test]
    fn test_read_waveform_decodes_blob() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        conn.execute(
            "INSERT INTO tr_data VALUES (1, 10, 1, 2, 1000000, ?1)",
            [samples_blob(&[0.5, -0.25])],
        )
        .unwrap();
        let mut db = SqliteWaveformDb { conn };
        let wave = db.read_waveform(1).unwrap();
        assert_eq!(wave.amplitude_v, vec![0.5, -0.25]);
        assert_eq!(wave.time_s, vec![0.0, 1e-6]);
    }

    #[test]
    fn test_read_waveform_missing_row_is_no_data() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        let mut db = SqliteWaveformDb { conn };
        assert!(matches!(db.read_waveform(42), Err(ReadFailure::NoData(42))));
    }

    #[test]
    fn test_read_waveform_null_blob_is_no_data() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        conn.execute("INSERT INTO tr_data VALUES (5, 10, 1, 0, 1000000, NULL)", [])
            .unwrap();
        let mut db = SqliteWaveformDb { conn };
        assert!(matches!(db.read_waveform(5), Err(ReadFailure::NoData(5))));
    }

    #[test]
    fn test_read_waveform_odd_blob_is_malformed() {
        let conn = Connection::open_in_memory().unwrap();
        fixture_tradb(&conn);
        conn.execute(
            "INSERT INTO tr_data VALUES (7, 10, 1, 1, 1000000, ?1)",
            [vec![1u8, 2, 3]],
        )
        .unwrap();
        let mut db = SqliteWaveformDb { conn };
        assert!(matches!(
            db.read_waveform(7),
            Err(ReadFailure::Malformed { event_id: 7, .. })
        ));
    }

    #[test]
    fn test_read_hits_projected_fields() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE view_ae_data (
                TRAI INTEGER, Chan INTEGER, Amp REAL, Dur REAL,
                Eny REAL, RMS REAL, CTP INTEGER, RiseT REAL
            );
            INSERT INTO view_ae_data VALUES (2, 1, 0.01, 55.0, 3.0, 0.002, 9, 4.5);",
        )
        .unwrap();
        let mut db = SqliteHitDb { conn };
        let hits = db.read_hits().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event_id, 2);
        assert_eq!(hits[0].counts, 9);
        assert_eq!(hits[0].rise_time, 4.5);
    }

    #[test]
    fn test_read_spectral_allows_null_fields() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE trf_data (TRAI INTEGER, FFT_FoM REAL, FFT_CoG REAL);
            INSERT INTO trf_data VALUES (1, 120.0, NULL);",
        )
        .unwrap();
        let mut db = SqliteSpectralDb { conn };
        let rows = db.read_spectral().unwrap();
        assert_eq!(rows[0].peak_freq_khz, Some(120.0));
        assert_eq!(rows[0].centroid_freq_khz, None);
    }
}
