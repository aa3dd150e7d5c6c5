//! Writes a synthetic congestion export in CP949, laid out like the real one.
//!
//! Usage: `generate_sample [DIR] [YYYYMMDD]`

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use encoding_rs::EUC_KR;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Congestion (%) at `minutes` past service-day midnight: morning and
/// evening rush peaks over a flat base.
fn congestion_profile(minutes: f64, scale: f64, rng: &mut SimpleRng) -> f64 {
    let peaks = [(8.0 * 60.0, 45.0, 110.0), (18.5 * 60.0, 60.0, 85.0), (13.0 * 60.0, 180.0, 20.0)];
    let signal: f64 = peaks
        .iter()
        .map(|&(mu, sigma, amp)| gaussian(minutes, mu, sigma, amp))
        .sum();
    ((10.0 + signal) * scale + rng.gauss(0.0, 3.0)).max(0.0)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Half-hour slots from 05:30 through 00:30 of the next calendar day, as
/// (label, minutes past service-day midnight).
fn time_slots() -> Vec<(String, u32)> {
    (11..=49)
        .map(|half_hours: u32| {
            let minutes = half_hours * 30;
            let label = format!("{:02}시{:02}분", (minutes / 60) % 24, minutes % 60);
            (label, minutes)
        })
        .collect()
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let date = args.next().unwrap_or_else(|| "20250930".to_string());
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        bail!("date must be YYYYMMDD, got '{date}'");
    }

    let mut rng = SimpleRng::new(42);

    // (line, station number, station name, directions, crowd scale)
    let stations: &[(&str, &str, &str, [&str; 2], f64)] = &[
        ("1호선", "150", "서울역", ["상선", "하선"], 1.0),
        ("1호선", "151", "시청", ["상선", "하선"], 0.8),
        ("1호선", "152", "종각", ["상선", "하선"], 0.9),
        ("2호선", "201", "시청", ["내선", "외선"], 0.85),
        ("2호선", "222", "강남", ["내선", "외선"], 1.3),
        ("2호선", "239", "홍대입구", ["내선", "외선"], 1.1),
        ("3호선", "320", "고속터미널", ["상선", "하선"], 1.05),
    ];
    let weekday_types = [("평일", 1.0), ("토요일", 0.65), ("일요일", 0.5)];
    let slots = time_slots();

    let mut text = String::from("요일구분,호선,역번호,출발역,상하구분");
    for (label, _) in &slots {
        write!(text, ",{label}")?;
    }
    text.push('\n');

    let mut rows = 0;
    for &(day, day_scale) in &weekday_types {
        for &(line, number, name, directions, scale) in stations {
            for direction in directions {
                write!(text, "{day},{line},{number},{name},{direction}")?;
                for &(_, minutes) in &slots {
                    // Occasional gaps, as in the published files.
                    if rng.next_f64() < 0.02 {
                        text.push(',');
                    } else {
                        let value = congestion_profile(minutes as f64, scale * day_scale, &mut rng);
                        write!(text, ",{value:.1}")?;
                    }
                }
                text.push('\n');
                rows += 1;
            }
        }
    }

    let (bytes, _, had_errors) = EUC_KR.encode(&text);
    if had_errors {
        bail!("sample text is not representable in cp949");
    }

    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("서울교통공사_지하철혼잡도정보_{date}.csv"));
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;

    println!(
        "Wrote {} rows × {} time slots to {}",
        rows,
        slots.len(),
        path.display()
    );
    Ok(())
}
