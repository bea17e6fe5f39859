//! Raylib-based GPU rendering: shell mesh upload, the shared voxel shader,
//! and the atlas/light-map/dungeon textures.
// Unsafe is required for Raylib mesh upload and raw texture updates here.

use std::collections::HashSet;
use std::error::Error;
use std::path::Path;

use raylib::prelude::*;

use tarn_camera::CameraFrame;
use tarn_lightmap::{LIGHT_MAP_SIZE, LightMap};
use tarn_mesh_cpu::{ShellMesh, VERTEX_STRIDE, build_onion_skin};
use tarn_sprites::{ATLAS_HEIGHT, ATLAS_WIDTH, DrawCmd, DrawList, SpriteAtlas};
use tarn_world::{OVERWORLD_HEIGHT, OVERWORLD_WIDTH};

pub mod conv {
    use tarn_geom::Vec3;

    pub fn vec3_to_rl(v: Vec3) -> raylib::prelude::Vector3 {
        raylib::prelude::Vector3::new(v.x, v.y, v.z)
    }

    pub fn vec3_from_rl(v: raylib::prelude::Vector3) -> Vec3 {
        Vec3 {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Dedicated texture units for the extra samplers, clear of the material
/// albedo slot.
const LIGHT_TEX_SLOT: i32 = 6;
const DUNGEON_TEX_SLOT: i32 = 7;

/// Cached uniform locations for the shared voxel program.
struct VoxelShaderLocs {
    sprite_id: i32,
    room_origin: i32,
    render_negative: i32,
    light_direction: i32,
    light_tex: i32,
    dungeon_tex: i32,
}

/// The voxel rendering pipeline: one onion-skin model per shell count (a
/// draw of k shells is a whole-model draw of the k-shell prefix), one
/// shared shader, and the three textures it samples.
pub struct VoxelRenderer {
    shader: raylib::shaders::WeakShader,
    locs: VoxelShaderLocs,
    /// Prefix models indexed by shell count - 1.
    shell_models: Vec<Model>,
    ground_model: Model,
    atlas_tex: Texture2D,
    light_tex: Texture2D,
    dungeon_tex: Texture2D,
    camera: Camera3D,
    /// Sprites we already warned about this session.
    missing_logged: HashSet<String>,
}

impl VoxelRenderer {
    /// Builds the pipeline. Shader compile/link failure is fatal: there is
    /// no fallback rendering path.
    pub fn new(
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        assets_root: &Path,
        atlas: &SpriteAtlas,
    ) -> Result<Self, Box<dyn Error>> {
        let (shader, locs) = load_voxel_shader(rl, thread, assets_root)?;

        let atlas_tex = make_texture(
            rl,
            thread,
            ATLAS_WIDTH as i32,
            ATLAS_HEIGHT as i32,
            Some(atlas.as_rgba()),
        )?;
        let light_tex = make_texture(
            rl,
            thread,
            LIGHT_MAP_SIZE as i32,
            LIGHT_MAP_SIZE as i32,
            None,
        )?;
        let dungeon_img = Image::gen_image_checked(
            2048,
            2048,
            32,
            32,
            Color::new(28, 24, 30, 255),
            Color::new(40, 34, 44, 255),
        );
        let dungeon_tex = rl.load_texture_from_image(thread, &dungeon_img)?;
        dungeon_tex.set_texture_filter(thread, raylib::consts::TextureFilter::TEXTURE_FILTER_POINT);

        // One model per shell count so partial-shell draws stay whole-model
        // draws.
        let full = build_onion_skin(16, 16, 16);
        let mut shell_models = Vec::with_capacity(full.full_shell_count());
        for shells in 1..=full.full_shell_count() {
            let mesh = upload_shell_prefix(&full, shells);
            let model = rl
                .load_model_from_mesh(thread, unsafe { mesh.make_weak() })
                .map_err(|e| format!("shell model upload failed: {e}"))?;
            shell_models.push(model);
        }
        let ground_mesh = upload_ground_plane();
        let ground_model = rl
            .load_model_from_mesh(thread, unsafe { ground_mesh.make_weak() })
            .map_err(|e| format!("ground model upload failed: {e}"))?;

        let mut renderer = Self {
            shader,
            locs,
            shell_models,
            ground_model,
            atlas_tex,
            light_tex,
            dungeon_tex,
            camera: Camera3D::perspective(
                Vector3::new(0.0, -200.0, 220.0),
                Vector3::zero(),
                Vector3::new(0.0, 0.0, 1.0),
                45.0,
            ),
            missing_logged: HashSet::new(),
        };
        renderer.rebind_models();
        Ok(renderer)
    }

    /// Points every model's material at the current shader and the atlas.
    fn rebind_models(&mut self) {
        let shader_src: *const raylib::ffi::Shader = self.shader.as_ref();
        for model in self
            .shell_models
            .iter_mut()
            .chain(std::iter::once(&mut self.ground_model))
        {
            if let Some(mat) = model.materials_mut().get_mut(0) {
                let dest = mat.shader_mut();
                let dest_ptr: *mut raylib::ffi::Shader = dest.as_mut();
                unsafe { std::ptr::copy_nonoverlapping(shader_src, dest_ptr, 1) };
                mat.set_material_texture(
                    raylib::consts::MaterialMapIndex::MATERIAL_MAP_ALBEDO,
                    &self.atlas_tex,
                );
            }
        }
    }

    /// Attempts a shader reload from disk; keeps the old program when the
    /// new one fails to compile.
    pub fn reload_shader(
        &mut self,
        rl: &mut RaylibHandle,
        thread: &RaylibThread,
        assets_root: &Path,
    ) -> bool {
        match load_voxel_shader(rl, thread, assets_root) {
            Ok((shader, locs)) => {
                self.shader = shader;
                self.locs = locs;
                self.rebind_models();
                log::info!("reloaded voxel shader");
                true
            }
            Err(e) => {
                log::warn!("voxel shader reload failed, keeping old: {e}");
                false
            }
        }
    }

    /// Re-uploads the atlas surface (after late sprite registrations).
    pub fn upload_atlas(&mut self, atlas: &SpriteAtlas) {
        unsafe {
            raylib::ffi::UpdateTexture(
                *self.atlas_tex.as_ref(),
                atlas.as_rgba().as_ptr() as *const _,
            );
        }
    }

    /// Uploads this frame's light map raster and the room origin the shader
    /// reads it against.
    pub fn upload_light_map(&mut self, light: &LightMap) {
        unsafe {
            raylib::ffi::UpdateTexture(
                *self.light_tex.as_ref(),
                light.as_rgba().as_ptr() as *const _,
            );
        }
        let (ox, oy) = light.room_origin();
        if self.locs.room_origin >= 0 {
            self.shader
                .set_shader_value(self.locs.room_origin, [ox, oy, 0.0]);
        }
    }

    pub fn set_light_direction(&mut self, direction: tarn_geom::Vec3) {
        if self.locs.light_direction >= 0 {
            self.shader.set_shader_value(
                self.locs.light_direction,
                [direction.x, direction.y, direction.z],
            );
        }
    }

    /// Consumes the final eye/target pair; smoothing happened upstream.
    pub fn set_camera(&mut self, frame: CameraFrame) {
        self.camera = Camera3D::perspective(
            conv::vec3_to_rl(frame.eye),
            conv::vec3_to_rl(frame.target),
            Vector3::new(0.0, 0.0, 1.0),
            frame.fov_degrees,
        );
    }

    /// Draws the world base plus every queued sprite for this frame.
    pub fn draw_frame(&mut self, d: &mut RaylibDrawHandle, atlas: &SpriteAtlas, draws: &DrawList) {
        let camera = self.camera;
        let mut d3 = d.begin_mode3D(camera);
        unsafe {
            // Both faces of every shell matter; the shader picks the sample
            // side from gl_FrontFacing.
            raylib::ffi::rlDisableBackfaceCulling();

            raylib::ffi::rlActiveTextureSlot(LIGHT_TEX_SLOT);
            raylib::ffi::rlEnableTexture(self.light_tex.as_ref().id);
            raylib::ffi::rlActiveTextureSlot(DUNGEON_TEX_SLOT);
            raylib::ffi::rlEnableTexture(self.dungeon_tex.as_ref().id);
            raylib::ffi::rlActiveTextureSlot(0);
        }
        if self.locs.light_tex >= 0 {
            self.shader
                .set_shader_value(self.locs.light_tex, LIGHT_TEX_SLOT);
        }
        if self.locs.dungeon_tex >= 0 {
            self.shader
                .set_shader_value(self.locs.dungeon_tex, DUNGEON_TEX_SLOT);
        }

        if atlas.has_world_texture() {
            // World base renders with sprite id -1: overworld texture above
            // ground, dungeon texture below the z threshold.
            if self.locs.sprite_id >= 0 {
                self.shader.set_shader_value(self.locs.sprite_id, -1.0f32);
            }
            d3.draw_model(&self.ground_model, Vector3::zero(), 1.0, Color::WHITE);
        }

        for cmd in draws.iter() {
            self.draw_single_sprite(&mut d3, atlas, cmd);
        }

        unsafe {
            raylib::ffi::rlEnableBackfaceCulling();
        }
    }

    /// One sprite draw: translate -> rotX -> rotZ -> rotX2 -> half-voxel
    /// recenter, sprite id uniform, one prefix-model draw. Fewer shells is
    /// a cheaper draw. Unregistered names log once and skip.
    fn draw_single_sprite(
        &mut self,
        d3: &mut RaylibMode3D<'_, RaylibDrawHandle<'_>>,
        atlas: &SpriteAtlas,
        cmd: &DrawCmd,
    ) {
        let Some(id) = atlas.id_of(&cmd.sprite) else {
            if self.missing_logged.insert(cmd.sprite.clone()) {
                log::warn!("no sprite found named: {}", cmd.sprite);
            }
            return;
        };

        if self.locs.sprite_id >= 0 {
            self.shader
                .set_shader_value(self.locs.sprite_id, id.0 as f32);
        }
        if cmd.negative && self.locs.render_negative >= 0 {
            self.shader
                .set_shader_value(self.locs.render_negative, 1.0f32);
        }

        // Row-vector composition: the leftmost factor applies first, so the
        // half-voxel recenter happens before the rotations and the final
        // translate places the sprite in the world.
        let mut transform = Matrix::translate(-8.0, -8.0, 0.0);
        if let Some(rx2) = cmd.rot_x2 {
            transform = transform * Matrix::rotate_x(rx2);
        }
        if cmd.rot_z != 0.0 {
            transform = transform * Matrix::rotate_z(cmd.rot_z);
        }
        if let Some(rx) = cmd.rot_x {
            transform = transform * Matrix::rotate_x(rx);
        }
        transform = transform * Matrix::translate(cmd.offset.x, cmd.offset.y, cmd.offset.z);

        let shells = cmd
            .shells
            .map(|s| (s as usize).clamp(1, self.shell_models.len()))
            .unwrap_or(self.shell_models.len());
        let transform: raylib::ffi::Matrix = transform.into();
        self.shell_models[shells - 1].as_mut().transform = transform;
        d3.draw_model(&self.shell_models[shells - 1], Vector3::zero(), 1.0, Color::WHITE);

        if cmd.negative && self.locs.render_negative >= 0 {
            self.shader
                .set_shader_value(self.locs.render_negative, 0.0f32);
        }
    }
}

fn load_voxel_shader(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    assets_root: &Path,
) -> Result<(raylib::shaders::WeakShader, VoxelShaderLocs), Box<dyn Error>> {
    let vs = assets_root.join("assets/shaders/voxel_sprite.vs");
    let fs = assets_root.join("assets/shaders/voxel_sprite.fs");
    let shader_strong = rl.load_shader(
        thread,
        Some(vs.to_string_lossy().as_ref()),
        Some(fs.to_string_lossy().as_ref()),
    );
    let shader = unsafe { shader_strong.make_weak() };

    let locs = VoxelShaderLocs {
        sprite_id: shader.get_shader_location("spriteId"),
        room_origin: shader.get_shader_location("avatarRoomOrigin"),
        render_negative: shader.get_shader_location("renderNegativeColor"),
        light_direction: shader.get_shader_location("lightDirection"),
        light_tex: shader.get_shader_location("lightTex"),
        dungeon_tex: shader.get_shader_location("dungeonTex"),
    };
    // A failed compile hands back raylib's default shader, which has none of
    // our uniforms. That is fatal at startup: no fallback path exists.
    if locs.sprite_id < 0 || locs.light_direction < 0 {
        return Err(format!(
            "voxel shader failed to compile (checked {} / {})",
            vs.display(),
            fs.display()
        )
        .into());
    }
    Ok((shader, locs))
}

fn make_texture(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    width: i32,
    height: i32,
    pixels: Option<&[u8]>,
) -> Result<Texture2D, Box<dyn Error>> {
    let img = Image::gen_image_color(width, height, Color::BLACK);
    let tex = rl
        .load_texture_from_image(thread, &img)
        .map_err(|e| format!("texture allocation failed: {e}"))?;
    tex.set_texture_filter(thread, raylib::consts::TextureFilter::TEXTURE_FILTER_POINT);
    tex.set_texture_wrap(thread, raylib::consts::TextureWrap::TEXTURE_WRAP_CLAMP);
    if let Some(px) = pixels {
        unsafe {
            raylib::ffi::UpdateTexture(*tex.as_ref(), px.as_ptr() as *const _);
        }
    }
    Ok(tex)
}

/// Uploads the first `shells` shells of the onion skin as one GPU mesh.
fn upload_shell_prefix(full: &ShellMesh, shells: usize) -> Mesh {
    let vertex_count = full.prefix_vertex_count(shells);
    upload_vertices(&full.vertices[..vertex_count * VERTEX_STRIDE], vertex_count)
}

/// A single quad spanning the overworld footprint at z = 0 for the
/// world-base draw.
fn upload_ground_plane() -> Mesh {
    let (w, h) = (OVERWORLD_WIDTH, OVERWORLD_HEIGHT);
    let n = [0.0f32, 0.0, 1.0];
    #[rustfmt::skip]
    let corners: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0], [w, 0.0, 0.0], [0.0, h, 0.0],
        [w, 0.0, 0.0], [w, h, 0.0], [0.0, h, 0.0],
    ];
    let mut verts = Vec::with_capacity(6 * VERTEX_STRIDE);
    for c in corners {
        verts.extend_from_slice(&c);
        verts.extend_from_slice(&n);
    }
    upload_vertices(&verts, 6)
}

fn upload_vertices(interleaved: &[f32], vertex_count: usize) -> Mesh {
    let mut raw: raylib::ffi::Mesh = unsafe { std::mem::zeroed() };
    raw.vertexCount = vertex_count as i32;
    raw.triangleCount = (vertex_count / 3) as i32;
    unsafe {
        let bytes = (vertex_count * 3 * std::mem::size_of::<f32>()) as u32;
        raw.vertices = raylib::ffi::MemAlloc(bytes) as *mut f32;
        raw.normals = raylib::ffi::MemAlloc(bytes) as *mut f32;
        for i in 0..vertex_count {
            let src = &interleaved[i * VERTEX_STRIDE..];
            std::ptr::copy_nonoverlapping(src.as_ptr(), raw.vertices.add(i * 3), 3);
            std::ptr::copy_nonoverlapping(src[3..].as_ptr(), raw.normals.add(i * 3), 3);
        }
        let mut mesh = Mesh::from_raw(raw);
        mesh.upload(false);
        mesh
    }
}
