use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;

use clap::Parser;
use log::{debug, error, info, warn};

use media_decode::{AudioDecoder, VideoDecoder};
use media_source::Source;
use media_transform::VideoTransform;
use media_types::{Error, Result};
use playback::{FramePacer, IDLE_DELAY, PlaybackSession, PresentationLoop, StreamMap};

mod audio_out;
mod display;

#[derive(Parser, Debug)]
#[command(name = "miniplay")]
#[command(about = "Multi-threaded demux/decode/present media player")]
struct Args {
    /// Input media path
    input: PathBuf,

    /// Write every presented frame as a PNG into this directory
    #[arg(long)]
    dump_frames: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("miniplay: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let source = Source::open(&args.input)?;

    let video_stream = source.video().map(|s| (s.index, s.time_base));
    let audio_stream = source.audio().map(|s| (s.index, s.time_base));

    // Open exactly one decoder per selected stream. A stream whose codec
    // has no decoder is dropped; that is only fatal once no stream is
    // left to play.
    let video_unit = match (video_stream, source.video_codec_config()) {
        (Some((_, time_base)), Some(config)) => match VideoDecoder::new(config, time_base) {
            Ok(unit) => Some(unit),
            Err(e) => {
                warn!("video stream disabled: {e}");
                None
            }
        },
        _ => None,
    };
    let mut audio_unit = match (audio_stream, source.audio_codec_config()) {
        (Some((_, time_base)), Some(config)) => match AudioDecoder::new(config, time_base) {
            Ok(unit) => Some(unit),
            Err(e) => {
                warn!("audio stream disabled: {e}");
                None
            }
        },
        _ => None,
    };

    // An audio stream is only worth routing if a device can drain it;
    // probing before the pipeline is wired keeps a missing device from
    // backing the whole session up.
    let audio_device = if audio_unit.is_some() {
        match audio_out::probe() {
            Ok(device) => Some(device),
            Err(e) => {
                warn!("audio stream disabled: {e}");
                audio_unit = None;
                None
            }
        }
    } else {
        None
    };

    if video_unit.is_none() && audio_unit.is_none() {
        return Err(Error::decoder_not_found("no playable streams"));
    }

    let map = StreamMap {
        video: video_stream.map(|(index, _)| index).filter(|_| video_unit.is_some()),
        audio: audio_stream.map(|(index, _)| index).filter(|_| audio_unit.is_some()),
    };

    let mut session = PlaybackSession::spawn(source, map, video_unit, audio_unit);
    let stop = session.stop_flag();

    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            warn!("no interrupt handler: {e}");
        }
    }

    // The audio device pulls for itself; the handle only needs to stay
    // alive while the presentation side runs on this thread.
    let _audio_output = match (audio_device, session.audio_frames()) {
        (Some(device), Some(frames)) => Some(audio_out::AudioOutput::start(
            device,
            frames,
            session.clock(),
            Arc::clone(&stop),
        )?),
        _ => None,
    };

    let result = match session.video_frames() {
        Some(frames) => {
            let (_, time_base) = video_stream.expect("video frames imply a video stream");
            let pacer = FramePacer::new(time_base, session.clock());
            let sink = display::FrameStats::new(args.dump_frames)?;
            let mut presentation = PresentationLoop::new(
                Some((frames, pacer)),
                VideoTransform::new(),
                sink,
                Arc::clone(&stop),
            );
            info!("playing");
            let result = presentation.run();
            info!("presented {} frames", presentation.frames_shown());
            result
        }
        None => run_audio_only(&session),
    };

    session.stop();
    result
}

/// Without video there is nothing to pace; wait for the audio side to
/// drain (or for an interrupt) instead.
fn run_audio_only(session: &PlaybackSession) -> Result<()> {
    let frames = session
        .audio_frames()
        .expect("audio-only playback implies an audio stream");
    let clock = session.clock();
    let stop = session.stop_flag();

    info!("playing (audio only)");
    loop {
        thread::sleep(IDLE_DELAY);
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }
        if frames.is_closed() && frames.is_empty() {
            debug!("audio stream drained at {:.2}s", clock.audio());
            return Ok(());
        }
    }
}
