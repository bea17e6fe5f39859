//! Top-level app: wires raylib, the renderer, and the sim session together
//! and drives the display loop at the fixed simulation rate.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use raylib::prelude::*;

use tarn_actors::{ActorRegistry, Button};
use tarn_render_raylib::VoxelRenderer;
use tarn_runtime::{FRAME_RATE, FramePacer, Mode, Session};
use tarn_sprites::SpriteAtlas;
use tarn_world::OVERWORLD_LIGHT_DIRECTION;

use crate::Args;
use crate::audio::StreamAudio;

pub struct App {
    session: Session,
    renderer: VoxelRenderer,
    pacer: FramePacer,
    shader_rx: Receiver<PathBuf>,
    _shader_watcher: Option<notify::RecommendedWatcher>,
    assets_root: PathBuf,
    save_path: PathBuf,
    game_over: bool,
}

impl App {
    pub fn new(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        assets_root: &Path,
        args: &Args,
    ) -> Result<Self, Box<dyn Error>> {
        let mut atlas = SpriteAtlas::new();
        crate::demo::register_sprites(&mut atlas, assets_root);
        let world = crate::demo::demo_world(assets_root);
        let registry = ActorRegistry::standard();

        let renderer = VoxelRenderer::new(rl, thread, assets_root, &atlas)?;

        let mut session = Session::new(world, registry, atlas);
        session.avatar.debug_no_death = args.debug;
        // Demo starting gear; a full campaign would earn these in caves.
        session.state.add_item("itemwoodensword");
        session.state.add_item("boomerang");

        let save_path = PathBuf::from(&args.save);
        if !args.new_game {
            if let Some(state) = crate::save::load(&save_path) {
                session.state = state;
                session.avatar.max_hit_points = session.state.max_hit_points.max(3.0);
            }
        }
        session.camera.begin_intro_zoom();

        let (watcher, shader_rx) = crate::watchers::watch_shaders(assets_root);

        Ok(Self {
            session,
            renderer,
            pacer: FramePacer::new(FRAME_RATE),
            shader_rx,
            _shader_watcher: watcher,
            assets_root: assets_root.to_path_buf(),
            save_path,
            game_over: false,
        })
    }

    pub fn run<A: StreamAudio>(
        &mut self,
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        audio: &mut A,
    ) {
        self.session.enter_start_room(audio);
        self.renderer.set_light_direction(OVERWORLD_LIGHT_DIRECTION);
        self.renderer.upload_atlas(&self.session.atlas);
        self.session
            .set_viewport_ratio(rl.get_screen_width() as f32 / rl.get_screen_height().max(1) as f32);

        while !rl.window_should_close() {
            if self.shader_rx.try_iter().count() > 0 {
                self.renderer.reload_shader(rl, thread, &self.assets_root);
            }

            crate::input_map::poll(rl, &mut self.session.input);

            if rl.is_window_resized() {
                self.session.set_viewport_ratio(
                    rl.get_screen_width() as f32 / rl.get_screen_height().max(1) as f32,
                );
            }

            // Fixed-step gate: under-budget display frames skip simulation
            // entirely (dropped, never batched) but still render and
            // request the next frame.
            let now_ms = rl.get_time() * 1000.0;
            if self.pacer.should_tick(now_ms) {
                if self.session.input.was_pressed(Button::Save) {
                    self.write_save();
                }
                let out = self.session.tick(audio);
                if let Some(direction) = out.light_direction {
                    self.renderer.set_light_direction(direction);
                }
                if let Some(frame) = out.camera {
                    self.renderer.set_camera(frame);
                }
                self.renderer.upload_light_map(&self.session.light);
                if out.game_over {
                    log::info!("game over");
                    self.game_over = true;
                }
            }
            audio.pump();

            let mut d = rl.begin_drawing(thread);
            d.clear_background(Color::BLACK);
            self.renderer
                .draw_frame(&mut d, &self.session.atlas, &self.session.draws);
            self.draw_hud(&mut d);
        }
    }

    /// Explicit save: remember the overworld position and write the blob.
    fn write_save(&mut self) {
        if !self.session.avatar.is_in_underworld() {
            let p = self.session.avatar.pos;
            self.session.state.last_overworld_location = Some([p.x, p.y, p.z]);
        }
        crate::save::write(&self.save_path, &self.session.state);
    }

    fn draw_hud(&self, d: &mut RaylibDrawHandle) {
        let s = &self.session;
        let line = format!(
            "hp {:.1}/{:.0}   coins {}   keys {}   bombs {}   item [{}]",
            s.avatar.hit_points.max(0.0),
            s.avatar.max_hit_points,
            s.state.coins,
            s.state.keys,
            s.state.bombs,
            s.avatar.current_item,
        );
        d.draw_text(&line, 12, 12, 20, Color::RAYWHITE);

        if matches!(s.mode, Mode::Paused) {
            d.draw_text(
                "paused - arrows pick an item, enter resumes",
                12,
                40,
                20,
                Color::GOLD,
            );
        }
        if self.game_over {
            let w = d.get_screen_width();
            let h = d.get_screen_height();
            d.draw_text("GAME OVER", w / 2 - 120, h / 2 - 20, 42, Color::RED);
        }
    }
}
