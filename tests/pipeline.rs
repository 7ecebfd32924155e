extern crate mandelbrot;

use mandelbrot::signal::Generation;
use mandelbrot::{
    escape_depth, render, Bounds, Button, Color, Config, ImageSurface, InputEvent, IntegralPlane,
    Key, Pixel, PixelOrder, RedrawMode, Surface, Viewport,
};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

fn expected_colors(viewport: &Viewport) -> HashMap<Pixel, [u8; 3]> {
    viewport
        .screen
        .pixels()
        .map(|pixel| {
            let depth = escape_depth(viewport.pixel_to_point(&pixel), viewport.max_depth);
            (pixel, Color::from_depth(depth, viewport.max_depth).to_rgb8())
        })
        .collect()
}

fn assert_matches_viewport(surface: &ImageSurface, viewport: &Viewport) {
    for (pixel, color) in expected_colors(viewport) {
        assert_eq!(surface.get(pixel), Some(color), "at {:?}", pixel);
    }
}

// Remembers every paint, with the generation token live at the time.
// The token is read without locking, so this is safe inside a paint.
struct Recorder {
    generation: Generation,
    paints: Vec<(u64, Pixel, [u8; 3])>,
}

impl Surface for Recorder {
    fn set_pixel(&mut self, pixel: Pixel, r: u8, g: u8, b: u8) {
        self.paints.push((self.generation.current(), pixel, [r, g, b]));
    }
}

#[test]
fn four_by_four_end_to_end() {
    let config = Config {
        screen: IntegralPlane(4, 4),
        bounds: Bounds {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        },
        max_depth: 4,
        workers: 1,
        batch_size: 16,
        recv_timeout: Duration::from_millis(20),
        ..Config::default()
    };
    let mut surface = ImageSurface::new(config.screen);
    let (complete, stats) = render(&config, |session| {
        let complete = session.wait_for_frame(&mut surface, Duration::from_secs(10));
        // Nothing else should arrive.
        session.drain(&mut surface, Duration::from_millis(50));
        (complete, session.stats())
    })
    .unwrap();

    assert!(complete);
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.painted, 16);
    assert_eq!(stats.discarded, 0);
    assert_matches_viewport(&surface, &config.viewport());

    // Every color on screen belongs to a depth in [0, 4].
    let palette: HashSet<[u8; 3]> = (0..=4).map(|d| Color::from_depth(d, 4).to_rgb8()).collect();
    for pixel in config.screen.pixels() {
        assert!(palette.contains(&surface.get(pixel).unwrap()));
    }
}

#[test]
fn rescale_storm_never_paints_stale_results() {
    // Zooming in by 0.25 and back out by 4 is exact in floating point,
    // so the viewport only ever takes one of two values.
    let config = Config {
        screen: IntegralPlane(16, 16),
        bounds: Bounds {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -2.0,
            y_max: 2.0,
        },
        max_depth: 32,
        workers: 4,
        batch_size: 8,
        queue_capacity: 8,
        recv_timeout: Duration::from_millis(20),
        seed: Some(99),
        ..Config::default()
    };
    let outer = config.viewport();
    let mut inner = outer;
    assert!(inner.rescale(0.25));
    let tables = [expected_colors(&outer), expected_colors(&inner)];

    let (paints, final_viewport, frame_ok, stats) = render(&config, |session| {
        let mut recorder = Recorder {
            generation: session.live_generation(),
            paints: Vec::new(),
        };
        for i in 0..1000 {
            let factor = if i % 2 == 0 { 0.25 } else { 4.0 };
            session.controller().rescale(factor);
            session.drain(&mut recorder, Duration::from_millis(0));
        }
        let frame_ok = session.wait_for_frame(&mut recorder, Duration::from_secs(20));
        (recorder.paints, session.viewport(), frame_ok, session.stats())
    })
    .unwrap();

    assert!(frame_ok);
    // No batch was painted after its generation stopped being the live one.
    assert_eq!(stats.stale, 0);
    assert_eq!(stats.painted, paints.len());
    assert_eq!(final_viewport, outer);

    // All paints made under one token agree with a single viewport.
    let mut by_token: HashMap<u64, Vec<(Pixel, [u8; 3])>> = HashMap::new();
    for (token, pixel, color) in &paints {
        by_token.entry(*token).or_default().push((*pixel, *color));
    }
    for (token, paints) in &by_token {
        let consistent = tables
            .iter()
            .any(|table| paints.iter().all(|(pixel, color)| table[pixel] == *color));
        assert!(consistent, "generation {} mixes viewports", token);
    }

    // The last paint of every pixel shows the final viewport.
    let mut last = HashMap::new();
    for (_, pixel, color) in &paints {
        last.insert(*pixel, *color);
    }
    assert_eq!(last.len(), 256);
    for (pixel, color) in &last {
        assert_eq!(tables[0][pixel], *color, "at {:?}", pixel);
    }
}

#[test]
fn depth_keys_rerender_with_the_new_cap() {
    let config = Config {
        screen: IntegralPlane(12, 9),
        bounds: Bounds {
            x_min: -2.0,
            x_max: 1.0,
            y_min: -1.2,
            y_max: 1.2,
        },
        max_depth: 8,
        workers: 3,
        batch_size: 5,
        recv_timeout: Duration::from_millis(20),
        order: PixelOrder::Scanline,
        ..Config::default()
    };
    let mut surface = ImageSurface::new(config.screen);
    let viewport = render(&config, |session| {
        assert!(session.wait_for_frame(&mut surface, Duration::from_secs(10)));
        session.handle(&InputEvent::Key(Key::DepthUp));
        session.handle(&InputEvent::Key(Key::DepthUp));
        session.handle(&InputEvent::Key(Key::DepthDown));
        assert!(session.wait_for_frame(&mut surface, Duration::from_secs(10)));
        session.viewport()
    })
    .unwrap();
    assert_eq!(viewport.max_depth, 16);
    assert_matches_viewport(&surface, &viewport);
}

#[test]
fn recycle_mode_redraws_every_pixel() {
    let config = Config {
        screen: IntegralPlane(10, 10),
        bounds: Bounds {
            x_min: -2.0,
            x_max: 1.0,
            y_min: -1.5,
            y_max: 1.5,
        },
        max_depth: 24,
        workers: 2,
        batch_size: 7,
        queue_capacity: 3,
        recv_timeout: Duration::from_millis(20),
        redraw: RedrawMode::Recycle,
        seed: Some(5),
        ..Config::default()
    };
    let mut surface = ImageSurface::new(config.screen);
    let viewport = render(&config, |session| {
        assert!(session.wait_for_frame(&mut surface, Duration::from_secs(10)));
        session.handle(&InputEvent::Click {
            pixel: Pixel(3, 6),
            button: Button::Primary,
        });
        assert!(session.wait_for_frame(&mut surface, Duration::from_secs(10)));
        session.viewport()
    })
    .unwrap();
    assert!(viewport.bounds.width() < 3.0);
    assert_matches_viewport(&surface, &viewport);
}

#[test]
fn shutdown_joins_every_thread_promptly() {
    let timeout = Duration::from_millis(50);
    let config = Config {
        screen: IntegralPlane(64, 64),
        max_depth: 64,
        workers: 4,
        recv_timeout: timeout,
        ..Config::default()
    };
    let mut surface = ImageSurface::new(config.screen);
    let mut left = None;
    render(&config, |session| {
        session.drain(&mut surface, Duration::from_millis(20));
        left = Some(Instant::now());
    })
    .unwrap();
    let waited = left.unwrap().elapsed();
    assert!(
        waited <= timeout * 2 + Duration::from_millis(250),
        "took {:?}",
        waited
    );
}
