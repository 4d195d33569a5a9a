//! A few textured crates spinning under a sun. Fly with WASD, quit with Escape.

use std::rc::Rc;

use forward_ngin::{
    DirectionalLight, EngineConfig, Entity, GraphicsFlow, Material, Scene, Surface,
    cgmath::Vector3, context::Context,
};
use instant::Duration;

#[derive(Default)]
struct SpinningCubes {
    angle: f32,
}

impl GraphicsFlow for SpinningCubes {
    async fn on_init(&mut self, ctx: &Context, config: &EngineConfig) -> anyhow::Result<Scene> {
        let material = Rc::new(
            Material::load(
                ctx,
                "textures/container.png",
                "textures/container_specular.png",
                32.0,
                config.stride_policy,
            )
            .await?,
        );

        let camera = Scene::default_camera(ctx, config);
        let light = DirectionalLight::new(Vector3::new(-0.2, -1.0, -0.3), 1.0);
        let mut scene = Scene::new(camera, light);
        for position in [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.5, -3.0),
            Vector3::new(-1.5, -0.5, -2.5),
        ] {
            scene.add(Entity::cube(
                &ctx.device,
                position,
                Vector3::new(0.0, 0.0, 0.0),
                material.clone(),
            ));
        }
        Ok(scene)
    }

    fn on_update(&mut self, scene: &mut Scene, _surface: &Surface, dt: Duration) {
        self.angle = (self.angle + 45.0 * dt.as_secs_f32()) % 360.0;
        for (i, entity) in scene.entities.iter_mut().enumerate() {
            let phase = self.angle + 30.0 * i as f32;
            entity.set_rotation(phase, phase * 0.5, 0.0);
        }
    }
}

fn main() -> anyhow::Result<()> {
    forward_ngin::run(EngineConfig::default(), SpinningCubes::default())
}
