// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelbrot::input::parse_pair;
use mandelbrot::{
    render, Bounds, Config, ImageSurface, InputEvent, IntegralPlane, PixelOrder, RedrawMode,
    RenderError,
};
use num::Complex;
use std::str::FromStr;
use std::time::Duration;

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_event(s: &str) -> Result<(), String> {
    InputEvent::from_str(s)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const BATCH: &str = "batch";
const ZOOM: &str = "zoom";
const RECYCLE: &str = "recycle";
const SCANLINE: &str = "scanline";
const SEED: &str = "seed";
const EVENT: &str = "event";
const TIMEOUT: &str = "timeout";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get().max(1) * 4;

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Progressive Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000x1000")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.5,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.5,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("128")
                .validator(move |s| {
                    validate_range(
                        &s,
                        2,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 2 and 200000",
                    )
                })
                .help("Initial iteration cap"),
        )
        .arg(
            Arg::with_name(BATCH)
                .required(false)
                .long(BATCH)
                .short("b")
                .takes_value(true)
                .default_value("20")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse batch size",
                        "Batch size must be between 1 and 100000",
                    )
                })
                .help("Pixels per work batch"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("0.2")
                .validator(move |s| {
                    validate_range(
                        &s,
                        0.001,
                        0.499,
                        "Could not parse zoom factor",
                        "Zoom factor must be between 0.001 and 0.499",
                    )
                })
                .help("Zoom factor for a zoom-in click; zoom-out uses its reciprocal"),
        )
        .arg(
            Arg::with_name(RECYCLE)
                .long(RECYCLE)
                .help("Reuse one pixel permutation for the whole session"),
        )
        .arg(
            Arg::with_name(SCANLINE)
                .long(SCANLINE)
                .help("Visit pixels in scanline order instead of at random"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    u64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse seed".to_string())
                })
                .help("Seed for the pixel shuffle"),
        )
        .arg(
            Arg::with_name(EVENT)
                .required(false)
                .long(EVENT)
                .short("e")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .validator(|s| validate_event(&s))
                .help("Input event to replay: in:X,Y, out:X,Y, depth-up or depth-down"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .required(false)
                .long(TIMEOUT)
                .takes_value(true)
                .default_value("60")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        86_400,
                        "Could not parse timeout",
                        "Timeout must be between 1 and 86400 seconds",
                    )
                })
                .help("Seconds to wait for each frame"),
        )
        .get_matches()
}

// clap has already run the validators, so these parses cannot fail.
fn config_from(matches: &ArgMatches) -> Config {
    let defaults = Config::default();
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .unwrap_or((defaults.screen.0, defaults.screen.1));
    let leftlower = matches.value_of(LEFTLOWER).and_then(parse_complex);
    let rightupper = matches.value_of(RIGHTUPPER).and_then(parse_complex);
    let bounds = match (leftlower, rightupper) {
        (Some(leftlower), Some(rightupper)) => Bounds::from_corners(leftlower, rightupper),
        _ => defaults.bounds,
    };
    let number = |name: &str| matches.value_of(name).and_then(|s| usize::from_str(s).ok());

    Config {
        screen: IntegralPlane(size.0, size.1),
        bounds,
        max_depth: number(ITERATIONS).unwrap_or(defaults.max_depth),
        workers: number(THREADS).unwrap_or(defaults.workers),
        batch_size: number(BATCH).unwrap_or(defaults.batch_size),
        zoom_in_factor: matches
            .value_of(ZOOM)
            .and_then(|s| f64::from_str(s).ok())
            .unwrap_or(defaults.zoom_in_factor),
        redraw: if matches.is_present(RECYCLE) {
            RedrawMode::Recycle
        } else {
            RedrawMode::Reshuffle
        },
        order: if matches.is_present(SCANLINE) {
            PixelOrder::Scanline
        } else {
            PixelOrder::Random
        },
        seed: matches.value_of(SEED).and_then(|s| u64::from_str(s).ok()),
        ..defaults
    }
}

fn run(matches: &ArgMatches) -> Result<(), RenderError> {
    let config = config_from(matches);
    let events: Vec<InputEvent> = matches
        .values_of(EVENT)
        .map(|values| values.filter_map(|s| InputEvent::from_str(s).ok()).collect())
        .unwrap_or_default();
    let timeout = Duration::from_secs(
        matches
            .value_of(TIMEOUT)
            .and_then(|s| u64::from_str(s).ok())
            .unwrap_or(60),
    );

    let mut surface = ImageSurface::new(config.screen);
    render(&config, |session| {
        session.wait_for_frame(&mut surface, timeout);
        for event in &events {
            session.handle(event);
            session.wait_for_frame(&mut surface, timeout);
        }
    })?;
    surface.write_pnm(matches.value_of(OUTPUT).unwrap_or_default())?;
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
