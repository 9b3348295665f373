use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::audio::AudioHandle;
use crate::clock::Clock;
use crate::machine::Machine;
use crate::shared::TICK_MS;

pub mod beats;
pub mod log;
pub mod player;

/// The 1 kHz tick, standing in for the original's repeating hardware
/// timer. Each tick takes the machine lock briefly, advances the loop
/// clock, and forwards any crossed events to the audio engine.
pub fn spawn_looper(
    machine: Arc<Mutex<Machine>>,
    audio: Arc<AudioHandle>,
    clock: Arc<dyn Clock>,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("looper".into())
        .spawn(move || {
            let mut cmds = Vec::new();
            while !shutdown.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(TICK_MS));
                let now = clock.now_us();
                cmds.clear();
                {
                    let Ok(mut m) = machine.lock() else { break };
                    m.tick(now, &mut cmds);
                }
                for &cmd in &cmds {
                    audio.send(cmd);
                }
            }
        })
}
