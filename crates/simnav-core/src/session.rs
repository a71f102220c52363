//! Host-facing facade over the planner, smoother, store and controllers.
//!
//! A session owns all mutable navigation state. The host drives it through
//! `&mut NavSession`: edit waypoints, plan, smooth, then call
//! [`NavSession::tick_guidance`] once per simulation step.

use crate::config::NavConfig;
use crate::error::{ConfigError, DocumentError, PlanError};
use crate::guidance::{
    ActivePath, Controller, ControllerKind, ControllerRequest, Guidance, GuidanceContext,
    PathSource,
};
use crate::models::{Point3, Pose, SceneNode, Setpoint};
use crate::route_planner::{RoutePlan, RoutePlanner};
use crate::smoothing::PathSmoother;
use crate::targets::TargetSelector;
use crate::waypoints::WaypointStore;
use std::path::Path;

/// Receives setpoints produced by guidance.
pub trait SetpointSink {
    fn apply(&mut self, setpoint: Setpoint);
}

impl<F> SetpointSink for F
where
    F: FnMut(Setpoint),
{
    fn apply(&mut self, setpoint: Setpoint) {
        self(setpoint)
    }
}

#[derive(Debug)]
pub struct NavSession {
    config: NavConfig,
    store: WaypointStore,
    planner: RoutePlanner,
    plan: Option<RoutePlan>,
    smoother: PathSmoother,
    /// What the current smoothed samples were fitted through.
    smoothed_input: Option<PathSource>,
    targets: TargetSelector,
    controller: Option<Controller>,
    active: Option<ActivePath>,
    active_stale: bool,
}

impl NavSession {
    pub fn new(config: NavConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let planner = RoutePlanner::new(config.planner.clone());
        Ok(Self {
            config,
            store: WaypointStore::new(),
            planner,
            plan: None,
            smoother: PathSmoother::new(),
            smoothed_input: None,
            targets: TargetSelector::new(),
            controller: None,
            active: None,
            active_stale: true,
        })
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn waypoints(&self) -> &WaypointStore {
        &self.store
    }

    /// Direct store access. Derived paths are kept.
    pub fn waypoints_mut(&mut self) -> &mut WaypointStore {
        self.active_stale = true;
        &mut self.store
    }

    pub fn add_waypoint(&mut self, point: Point3) -> usize {
        self.active_stale = true;
        self.store.add(point)
    }

    /// Remove every waypoint along with the paths derived from them.
    pub fn clear_waypoints(&mut self) {
        self.store.clear();
        self.drop_derived_paths();
    }

    /// Replace the waypoints from a document. On success derived paths are
    /// dropped; on error nothing changes.
    pub fn load_waypoints(&mut self, text: &str) -> Result<usize, DocumentError> {
        let count = self.store.deserialize(text)?;
        self.drop_derived_paths();
        Ok(count)
    }

    pub fn load_waypoints_file(&mut self, path: impl AsRef<Path>) -> Result<usize, DocumentError> {
        let count = self.store.load_file(path)?;
        self.drop_derived_paths();
        Ok(count)
    }

    pub fn save_waypoints(&self) -> Result<String, DocumentError> {
        self.store.serialize()
    }

    pub fn save_waypoints_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        self.store.save_file(path)
    }

    /// Plan around `scene` through the stored waypoints. The new plan
    /// replaces any previous one wholesale, along with samples smoothed
    /// from it.
    pub fn plan_between_waypoints(&mut self, scene: &[SceneNode]) -> Result<&RoutePlan, PlanError> {
        let plan = self
            .planner
            .plan_between_waypoints(self.store.positions(), scene)?;
        if self.smoothed_input == Some(PathSource::Planned) {
            self.smoother.clear();
            self.smoothed_input = None;
        }
        self.active_stale = true;
        Ok(self.plan.insert(plan))
    }

    pub fn route_plan(&self) -> Option<&RoutePlan> {
        self.plan.as_ref()
    }

    pub fn planned_path(&self) -> &[Point3] {
        self.plan
            .as_ref()
            .map(|plan| plan.points.as_slice())
            .unwrap_or_default()
    }

    /// Smooth the planned path, or the raw waypoints when nothing is planned.
    /// `None` arguments fall back to the configured values.
    pub fn build_smoothed_path(&mut self, tension: Option<f64>, density: Option<usize>) -> &[Point3] {
        let tension = tension.unwrap_or(self.config.smoothing.tension);
        let density = density.unwrap_or(self.config.smoothing.density);
        let (input, source) = match self.plan.as_ref() {
            Some(plan) if !plan.points.is_empty() => (plan.points.as_slice(), PathSource::Planned),
            _ => (self.store.positions(), PathSource::Waypoints),
        };
        self.active_stale = true;
        let samples = self.smoother.build(input, tension, density);
        self.smoothed_input = (!samples.is_empty()).then_some(source);
        samples
    }

    pub fn smoothed_path(&self) -> &[Point3] {
        self.smoother.samples()
    }

    /// Which path guidance would follow right now: samples smoothed from the
    /// current plan, then the plan, then samples smoothed from the raw
    /// waypoints, then the waypoints.
    pub fn active_source(&self) -> Option<PathSource> {
        let smoothed = !self.smoother.samples().is_empty();
        if smoothed && self.smoothed_input == Some(PathSource::Planned) {
            Some(PathSource::Smoothed)
        } else if !self.planned_path().is_empty() {
            Some(PathSource::Planned)
        } else if smoothed {
            Some(PathSource::Smoothed)
        } else if !self.store.is_empty() {
            Some(PathSource::Waypoints)
        } else {
            None
        }
    }

    pub fn targets(&self) -> &TargetSelector {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetSelector {
        &mut self.targets
    }

    /// Swap in the controller for `request`. The previous controller is
    /// deactivated; the new one is activated from a clean state.
    pub fn select_controller(
        &mut self,
        request: ControllerRequest,
        scene_name: Option<&str>,
    ) -> Option<ControllerKind> {
        if let Some(old) = self.controller.as_mut() {
            old.on_deactivate();
        }

        let kind = request.resolve(scene_name);
        self.controller = kind.map(|kind| {
            let mut controller = Controller::from_kind(kind, &self.config.guidance);
            controller.reset();
            controller.on_activate();
            controller
        });

        let label = kind.map_or_else(|| "none".to_string(), |k| k.to_string());
        tracing::info!(
            ?request,
            scene = scene_name.unwrap_or(""),
            controller = %label,
            "selected controller"
        );
        kind
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    /// Run the active controller for one step and forward any setpoint to
    /// `sink`.
    pub fn tick_guidance<S>(&mut self, dt: f64, pose: Pose, sink: &mut S) -> Option<Setpoint>
    where
        S: SetpointSink + ?Sized,
    {
        self.refresh_active_path();

        let controller = self.controller.as_mut()?;
        let ctx = GuidanceContext {
            dt,
            pose,
            path: self.active.as_ref(),
            mission: self.store.settings(),
            target: self.targets.position(),
        };

        let setpoint = controller.update(&ctx)?;
        if !setpoint.is_finite() {
            tracing::warn!(?setpoint, "dropped non-finite setpoint");
            return None;
        }
        sink.apply(setpoint);
        Some(setpoint)
    }

    fn drop_derived_paths(&mut self) {
        self.plan = None;
        self.smoother.clear();
        self.smoothed_input = None;
        self.active_stale = true;
    }

    fn refresh_active_path(&mut self) {
        if !self.active_stale {
            return;
        }
        self.active = self.active_source().map(|source| {
            let points = match source {
                PathSource::Planned => self.planned_path().to_vec(),
                PathSource::Smoothed => self.smoother.samples().to_vec(),
                PathSource::Waypoints => self.store.positions().to_vec(),
            };
            ActivePath::new(points, source)
        });
        self.active_stale = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::GuidancePhase;

    fn session() -> NavSession {
        NavSession::new(NavConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = NavConfig::default();
        config.planner.cell_size = -1.0;
        assert!(NavSession::new(config).is_err());
    }

    #[test]
    fn plan_outranks_samples_smoothed_from_waypoints() {
        let mut s = session();
        assert_eq!(s.active_source(), None);

        s.add_waypoint(Point3::new(0.0, 0.8, 0.0));
        s.add_waypoint(Point3::new(1.0, 0.8, 0.0));
        assert_eq!(s.active_source(), Some(PathSource::Waypoints));

        s.build_smoothed_path(None, None);
        assert_eq!(s.smoothed_path().len(), 20);
        assert_eq!(s.active_source(), Some(PathSource::Smoothed));

        s.plan_between_waypoints(&[]).unwrap();
        assert_eq!(s.active_source(), Some(PathSource::Planned));

        s.clear_waypoints();
        assert_eq!(s.active_source(), None);
        assert!(s.route_plan().is_none());
    }

    #[test]
    fn smoothing_prefers_planned_points() {
        let mut s = session();
        s.add_waypoint(Point3::new(0.0, 0.8, 0.0));
        s.add_waypoint(Point3::new(2.0, 0.8, 0.0));
        let planned = s.plan_between_waypoints(&[]).unwrap().points.len();
        assert!(planned > 2);
        let samples = s.build_smoothed_path(Some(0.5), Some(4)).len();
        assert_eq!(samples, (planned - 1) * 4);
    }

    #[test]
    fn samples_smoothed_from_plan_become_active() {
        let mut s = session();
        s.add_waypoint(Point3::new(0.0, 0.8, 0.0));
        s.add_waypoint(Point3::new(2.0, 0.8, 0.0));
        s.plan_between_waypoints(&[]).unwrap();
        s.build_smoothed_path(None, None);
        assert_eq!(s.active_source(), Some(PathSource::Smoothed));

        s.plan_between_waypoints(&[]).unwrap();
        assert!(s.smoothed_path().is_empty());
        assert_eq!(s.active_source(), Some(PathSource::Planned));
    }

    #[test]
    fn smoothed_plan_steers_toward_lookahead_sample() {
        let mut s = session();
        s.add_waypoint(Point3::new(0.0, 0.8, 0.0));
        s.add_waypoint(Point3::new(0.0, 0.8, 2.0));
        s.add_waypoint(Point3::new(2.0, 0.8, 2.0));
        s.plan_between_waypoints(&[]).unwrap();
        s.build_smoothed_path(None, None);
        s.select_controller(ControllerRequest::Waypoints, None);

        // Waypoint 0 lies straight ahead on +x; the lookahead sample is
        // further along the first leg toward +z.
        let start = s.smoothed_path()[0];
        let aim = s.smoothed_path()[5];
        assert!(aim.z > start.z);
        assert!((aim.x - start.x).abs() < 1e-9);

        let pose = Pose::at(Point3::new(start.x - 0.5, 0.8, start.z));
        let mut sink = |_: Setpoint| {};
        let sp = s.tick_guidance(0.1, pose, &mut sink).unwrap();
        assert!(sp.pitch < 0.0);
        assert!(sp.roll > 0.0);
    }

    #[test]
    fn no_controller_means_no_setpoint() {
        let mut s = session();
        s.add_waypoint(Point3::new(1.0, 0.8, 0.0));
        let mut sent = Vec::new();
        let mut sink = |sp: Setpoint| sent.push(sp);
        assert!(s.tick_guidance(0.1, Pose::default(), &mut sink).is_none());
        assert!(sent.is_empty());
    }

    #[test]
    fn tick_forwards_setpoint_to_sink() {
        let mut s = session();
        s.add_waypoint(Point3::new(3.0, 0.8, 0.0));
        assert_eq!(
            s.select_controller(ControllerRequest::Waypoints, None),
            Some(ControllerKind::Waypoints)
        );

        let mut sent = Vec::new();
        let mut sink = |sp: Setpoint| sent.push(sp);
        let sp = s.tick_guidance(0.1, Pose::default(), &mut sink).unwrap();
        assert_eq!(sent, vec![sp]);
        assert!(sp.pitch < 0.0);
    }

    #[test]
    fn guidance_sees_waypoints_added_after_selection() {
        let mut s = session();
        s.select_controller(ControllerRequest::Auto, Some("skydio_x2/scene.xml"));
        let mut sink = |_: Setpoint| {};
        assert!(s.tick_guidance(0.1, Pose::default(), &mut sink).is_none());

        s.add_waypoint(Point3::new(0.05, 0.8, 0.0));
        assert!(s.tick_guidance(0.1, Pose::default(), &mut sink).is_some());
        let phase = s
            .controller()
            .and_then(Controller::as_waypoint)
            .map(|f| f.phase());
        assert_eq!(phase, Some(GuidancePhase::Dwelling));
    }

    #[test]
    fn follow_uses_selected_target() {
        let mut s = session();
        s.select_controller("follow".parse().unwrap(), None);
        let mut sink = |_: Setpoint| {};
        assert!(s.tick_guidance(0.1, Pose::default(), &mut sink).is_none());

        s.targets_mut().set_enabled(true);
        s.targets_mut().select("cart", Point3::new(2.0, 0.0, 0.0));
        let sp = s.tick_guidance(0.1, Pose::default(), &mut sink).unwrap();
        assert!((sp.altitude - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reselecting_resets_controller_state() {
        let mut s = session();
        s.add_waypoint(Point3::ZERO);
        s.add_waypoint(Point3::new(5.0, 0.0, 0.0));
        s.waypoints_mut().set_dwell_seconds(0.0).unwrap();
        s.select_controller(ControllerRequest::Waypoints, None);
        let mut sink = |_: Setpoint| {};
        s.tick_guidance(0.1, Pose::default(), &mut sink);
        let index = |s: &NavSession| s.controller().and_then(Controller::as_waypoint).map(|f| f.index());
        assert_eq!(index(&s), Some(1));

        s.select_controller(ControllerRequest::Waypoints, None);
        assert_eq!(index(&s), Some(0));
    }

    #[test]
    fn failed_load_keeps_derived_paths() {
        let mut s = session();
        s.add_waypoint(Point3::ZERO);
        s.add_waypoint(Point3::new(1.0, 0.0, 0.0));
        s.plan_between_waypoints(&[]).unwrap();
        assert!(s.load_waypoints("{not valid").is_err());
        assert!(s.route_plan().is_some());
        assert_eq!(s.waypoints().len(), 2);

        s.load_waypoints(r#"[{"x":3,"y":0,"z":3}]"#).unwrap();
        assert!(s.route_plan().is_none());
    }
}
