//! Per-tick snapshots of the vehicles on a lane, in several text formats.

use crate::lane::Lane;
use crate::vehicle::Vehicle;
use itertools::Itertools;
use serde_json::json;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

/// The state of one vehicle at one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleSnapshot {
    pub tick: usize,
    pub id: usize,
    pub vel: f64,
    pub max_speed: f64,
    pub visibility_time: f64,
    pub min_gap_time: f64,
    pub pos: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub crashed: bool,
}

/// A snapshot output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    /// Comma separated values, one vehicle per line.
    Csv,
    /// CSS style `key:value;` pairs, one vehicle per line.
    Css,
    /// XML attributes, one vehicle per line.
    XmlAttr,
    /// A JSON array of frames, each an array of vehicle objects.
    #[default]
    Json,
}

impl VehicleSnapshot {
    /// Captures the state of a vehicle.
    pub fn new(tick: usize, vehicle: &Vehicle) -> Self {
        Self {
            tick,
            id: vehicle.number(),
            vel: vehicle.vel(),
            max_speed: vehicle.max_speed(),
            visibility_time: vehicle.visibility_time(),
            min_gap_time: vehicle.min_gap_time(),
            pos: vehicle.pos(),
            acceleration: vehicle.acceleration(),
            deceleration: vehicle.deceleration(),
            crashed: vehicle.crashed(),
        }
    }

    /// The fields in output order, as `(name, value)` pairs.
    fn fields(&self) -> [(&'static str, String); 10] {
        [
            ("t", self.tick.to_string()),
            ("id", self.id.to_string()),
            ("v_cur", format!("{:.1}", self.vel)),
            ("v_max", format!("{:.1}", self.max_speed)),
            ("t_vis", format!("{:.1}", self.visibility_time)),
            ("t_min", format!("{:.1}", self.min_gap_time)),
            ("d_pos", format!("{:.1}", self.pos)),
            ("a_acc", format!("{:.1}", self.acceleration)),
            ("a_dec", format!("{:.1}", self.deceleration)),
            ("crash", (self.crashed as u8).to_string()),
        ]
    }

    /// Renders the snapshot as a single line of the given format,
    /// without a line terminator.
    pub fn to_line(&self, format: Format) -> String {
        let fields = self.fields();
        match format {
            Format::Csv => fields.iter().map(|(_, value)| value).join(", "),
            Format::Css => fields
                .iter()
                .map(|(key, value)| format!("{}:{};", key, value))
                .join(""),
            Format::XmlAttr => fields
                .iter()
                .map(|(key, value)| format!("{}=\"{}\"", key, value))
                .join(" "),
            Format::Json => self.to_json().to_string(),
        }
    }

    /// Gets the snapshot as a JSON object.
    /// Numbers are rounded to one decimal place, as in the line formats.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "t": self.tick,
            "id": self.id,
            "v_cur": round1(self.vel),
            "v_max": round1(self.max_speed),
            "t_vis": round1(self.visibility_time),
            "t_min": round1(self.min_gap_time),
            "d_pos": round1(self.pos),
            "a_acc": round1(self.acceleration),
            "a_dec": round1(self.deceleration),
            "crash": self.crashed as u8,
        })
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Writes a run of per-tick snapshots to an output stream.
pub struct SnapshotWriter<W: Write> {
    out: W,
    format: Format,
    /// The number of frames written so far.
    frames: usize,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            frames: 0,
        }
    }

    /// Writes the state of every vehicle on the lane, front to back.
    pub fn write_frame(&mut self, tick: usize, lane: &Lane) -> io::Result<()> {
        let snapshots = lane.iter().map(|vehicle| VehicleSnapshot::new(tick, vehicle));
        match self.format {
            Format::Json => {
                let frame = snapshots.map(|s| s.to_json()).collect::<Vec<_>>();
                let sep = if self.frames == 0 { "[\n" } else { ",\n" };
                write!(self.out, "{}{}", sep, serde_json::Value::Array(frame))?;
            }
            format => {
                for snapshot in snapshots {
                    writeln!(self.out, "{}", snapshot.to_line(format))?;
                }
            }
        }
        self.frames += 1;
        Ok(())
    }

    /// The number of frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Terminates the output and hands back the underlying stream.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == Format::Json {
            let end = if self.frames == 0 { "[]\n" } else { "\n]\n" };
            self.out.write_all(end.as_bytes())?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Csv => "csv",
            Format::Css => "css",
            Format::XmlAttr => "xml-attr",
            Format::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "css" => Ok(Format::Css),
            "xml" | "xml-attr" => Ok(Format::XmlAttr),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::VehicleAttributes;

    fn lane() -> Lane {
        let mut lane = Lane::new();
        let attributes = VehicleAttributes {
            max_speed: 40.0,
            speed_tolerance: 0.0,
            visibility_time: 5.0,
            min_gap_time: 2.0,
            acceleration: 2.5,
            deceleration: 5.0,
        };
        for pos in [100.0, 50.26] {
            let id = lane.create_with(&attributes);
            lane.place(id, pos, 12.34).unwrap();
            lane.push_back(id).unwrap();
        }
        lane
    }

    fn snapshot() -> VehicleSnapshot {
        VehicleSnapshot::new(7, lane().front().unwrap())
    }

    #[test]
    fn csv_line() {
        assert_eq!(
            snapshot().to_line(Format::Csv),
            "7, 0, 12.3, 40.0, 5.0, 2.0, 100.0, 2.5, 5.0, 0"
        );
    }

    #[test]
    fn css_line() {
        assert_eq!(
            snapshot().to_line(Format::Css),
            "t:7;id:0;v_cur:12.3;v_max:40.0;t_vis:5.0;t_min:2.0;d_pos:100.0;a_acc:2.5;a_dec:5.0;crash:0;"
        );
    }

    #[test]
    fn xml_attr_line() {
        assert_eq!(
            snapshot().to_line(Format::XmlAttr),
            "t=\"7\" id=\"0\" v_cur=\"12.3\" v_max=\"40.0\" t_vis=\"5.0\" t_min=\"2.0\" d_pos=\"100.0\" a_acc=\"2.5\" a_dec=\"5.0\" crash=\"0\""
        );
    }

    #[test]
    fn json_run_is_valid() {
        let lane = lane();
        let mut writer = SnapshotWriter::new(vec![], Format::Json);
        writer.write_frame(0, &lane).unwrap();
        writer.write_frame(1, &lane).unwrap();
        assert_eq!(writer.frames(), 2);
        let out = writer.finish().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let frames = value.as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].as_array().unwrap().len(), 2);
        assert_eq!(frames[1][0]["t"], 1);
        assert_eq!(frames[1][1]["id"], 1);
        assert_eq!(frames[0][1]["d_pos"], 50.3);
        assert_eq!(frames[0][1]["v_cur"], 12.3);
        assert_eq!(frames[0][1]["v_max"], 40.0);
        assert_eq!(frames[0][0]["crash"], 0);
    }

    #[test]
    fn empty_json_run() {
        let writer = SnapshotWriter::new(vec![], Format::Json);
        let out = writer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }

    #[test]
    fn csv_frame_has_line_per_vehicle() {
        let mut writer = SnapshotWriter::new(vec![], Format::Csv);
        writer.write_frame(3, &lane()).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("3, 1, 12.3, 40.0"));
        assert!(lines[1].contains(", 50.3, "));
    }

    #[test]
    fn parse_format() {
        assert_eq!("CSV".parse::<Format>(), Ok(Format::Csv));
        assert_eq!("xml".parse::<Format>(), Ok(Format::XmlAttr));
        assert_eq!(Format::XmlAttr.to_string().parse::<Format>(), Ok(Format::XmlAttr));
        assert!("yaml".parse::<Format>().is_err());
    }
}
