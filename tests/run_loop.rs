use ogl4core::{
    egui, Config, Context, Core, EguiOverlay, Error, Event, Factory, Frame, Key, KeyAction, Mods, MouseButton,
    MouseButtonAction, OrbitCamera, Pixels, PluginRegistry, RenderPlugin, Result, Surface,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::os::raw::c_void;
use std::rc::Rc;
use std::{fs, ptr};

type Log = Rc<RefCell<Vec<String>>>;
type CameraSlot = Rc<RefCell<Option<Rc<RefCell<OrbitCamera>>>>>;

const WIDTH: u32 = 32;
const HEIGHT: u32 = 16;

/// A window without a GL context that replays one batch of events per frame.
#[derive(Default)]
struct ScriptedSurface {
    script: VecDeque<Vec<Event>>,
    size: Option<(u32, u32)>,
    titles: Vec<String>,
    swaps: usize,
}

impl ScriptedSurface {
    fn new(script: Vec<Vec<Event>>) -> Self {
        ScriptedSurface { script: script.into(), ..Default::default() }
    }
}

impl Surface for ScriptedSurface {
    fn proc_address(&self, _symbol: &str) -> *const c_void {
        ptr::null()
    }

    fn size(&self) -> (u32, u32) {
        self.size.unwrap_or((WIDTH, HEIGHT))
    }

    fn poll_events(&mut self, events: &mut Vec<Event>) {
        if let Some(batch) = self.script.pop_front() {
            events.extend(batch);
        }
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.swaps += 1;
        Ok(())
    }

    fn capture(&mut self, _factory: &Factory) -> Result<Pixels> {
        Ok(Pixels::filled(WIDTH, HEIGHT, [255, 0, 0, 255]))
    }

    fn set_title(&mut self, title: &str) {
        self.titles.push(title.to_owned());
    }
}

struct Recorder {
    name: &'static str,
    log: Log,
    _camera: Option<Rc<RefCell<OrbitCamera>>>,
}

impl Recorder {
    fn record(&self, entry: String) {
        self.log.borrow_mut().push(format!("{} {}", self.name, entry));
    }
}

impl RenderPlugin for Recorder {
    fn render(&mut self, ctx: &mut Context) -> Result<()> {
        self.record(format!("render {}", ctx.frame()));
        Ok(())
    }

    fn resize(&mut self, _ctx: &mut Context, width: u32, height: u32) -> Result<()> {
        self.record(format!("resize {}x{}", width, height));
        Ok(())
    }

    fn keyboard(&mut self, _ctx: &mut Context, key: Key, _action: KeyAction, _mods: Mods) -> Result<()> {
        self.record(format!("key {:?}", key));
        Ok(())
    }

    fn gui(&mut self, ctx: &mut Context, ui: &mut egui::Ui) -> Result<()> {
        ui.label(self.name);
        self.record(format!("gui {}", ctx.frame()));
        Ok(())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.record("drop".to_owned());
    }
}

fn recorder(registry: &mut PluginRegistry, name: &'static str, idx: u32, log: &Log) {
    let log = log.clone();
    registry
        .register(name, "Test/Recorder", idx, move |ctx| {
            let (dx, dy) = ctx.cursor_delta();
            log.borrow_mut().push(format!("{} create delta {},{}", name, dx, dy));
            Ok(Box::new(Recorder { name, log: log.clone(), _camera: None }) as Box<dyn RenderPlugin>)
        })
        .unwrap();
}

/// Registers a camera on creation and also hands it to `slot`, keeping it
/// alive after the plugin is gone.
fn camera_recorder(registry: &mut PluginRegistry, name: &'static str, idx: u32, log: &Log, slot: &CameraSlot) {
    let log = log.clone();
    let slot = slot.clone();
    registry
        .register(name, "Test/Camera", idx, move |ctx| {
            let camera = Rc::new(RefCell::new(OrbitCamera::new(5.0)));
            ctx.register_camera(&camera)?;
            *slot.borrow_mut() = Some(camera.clone());
            log.borrow_mut().push(format!("{} create", name));
            Ok(Box::new(Recorder { name, log: log.clone(), _camera: Some(camera) }) as Box<dyn RenderPlugin>)
        })
        .unwrap();
}

fn config(plugin: &str) -> Config {
    Config { plugin: Some(plugin.to_owned()), ..Config::default() }
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

fn key(key: Key, mods: Mods) -> Event {
    Event::Key { key, action: KeyAction::Press, mods }
}

#[test]
fn plugin_is_resized_once_before_first_render() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let config = Config { quit: true, ..config("A") };
    let mut core = Core::new(ScriptedSurface::default(), registry, &config);
    core.run().unwrap();

    assert_eq!(
        entries(&log),
        ["A create delta 0,0", "A resize 32x16", "A render 0", "A drop"],
    );
    assert_eq!(core.surface().swaps, 1);
}

#[test]
fn scripted_screenshots_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let config = Config {
        screenshot: vec![7, 3],
        filename: dir.path().join("shot"),
        quit: true,
        ..config("A")
    };
    let mut core = Core::new(ScriptedSurface::default(), registry, &config);
    core.run().unwrap();

    let renders = entries(&log).iter().filter(|e| e.contains("render")).count();
    assert_eq!(renders, 8);

    let mut files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(files, ["shot_00003.png", "shot_00007.png"]);

    let shot = Pixels::load(dir.path().join("shot_00003.png")).unwrap();
    assert_eq!((shot.width(), shot.height()), (WIDTH, HEIGHT));
}

#[test]
fn without_plugin_option_the_lowest_idx_starts() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "Late", 9, &log);
    recorder(&mut registry, "Early", 2, &log);

    let mut core = Core::new(ScriptedSurface::default(), registry, &Config::default());
    core.start().unwrap();
    assert_eq!(core.active_plugin(), Some("Early"));
}

#[test]
fn empty_registry_cannot_start() {
    let mut core = Core::new(ScriptedSurface::default(), PluginRegistry::new(), &Config::default());
    assert!(matches!(core.start(), Err(Error::NoPlugins)));
}

#[test]
fn unknown_plugin_keeps_the_current_one() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let mut core = Core::new(ScriptedSurface::default(), registry, &config("A"));
    core.start().unwrap();
    match core.switch_plugin("Missing") {
        Err(Error::UnknownPlugin(name)) => assert_eq!(name, "Missing"),
        other => panic!("unexpected {:?}", other.err()),
    }
    assert_eq!(core.active_plugin(), Some("A"));
    assert!(!entries(&log).contains(&"A drop".to_owned()));
}

#[test]
fn switching_drops_old_plugin_before_creating_new_one() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);
    recorder(&mut registry, "B", 2, &log);

    let script = vec![
        vec![Event::CursorMoved { x: 10.0, y: 10.0 }],
        vec![Event::CursorMoved { x: 30.0, y: 50.0 }],
    ];
    let mut core = Core::new(ScriptedSurface::new(script), registry, &config("A"));
    core.start().unwrap();
    core.run_frame().unwrap();
    core.run_frame().unwrap();
    assert_eq!(core.context().cursor_delta(), (20.0, 40.0));

    log.borrow_mut().clear();
    core.switch_plugin("B").unwrap();
    assert_eq!(entries(&log), ["A drop", "B create delta 0,0", "B resize 32x16"]);
    assert_eq!(core.active_plugin(), Some("B"));
}

#[test]
fn camera_registration_ends_with_its_plugin() {
    let log = Log::default();
    let slot = CameraSlot::default();
    let mut registry = PluginRegistry::new();
    camera_recorder(&mut registry, "Cam", 1, &log, &slot);
    recorder(&mut registry, "Plain", 2, &log);

    let mut core = Core::new(ScriptedSurface::default(), registry, &config("Cam"));
    core.start().unwrap();
    assert!(core.context().camera().is_some());

    core.switch_plugin("Plain").unwrap();
    assert!(slot.borrow().is_some());
    assert!(core.context().camera().is_none());

    // The leaked camera does not block a fresh registration.
    core.switch_plugin("Cam").unwrap();
    assert!(core.context().camera().is_some());
}

#[test]
fn unmodified_right_drag_dollies_the_camera() {
    let log = Log::default();
    let slot = CameraSlot::default();
    let mut registry = PluginRegistry::new();
    camera_recorder(&mut registry, "Cam", 1, &log, &slot);

    let press = |mods| Event::MouseButton { button: MouseButton::Right, action: MouseButtonAction::Press, mods };
    let script = vec![
        vec![
            Event::CursorMoved { x: 16.0, y: 8.0 },
            press(Mods::empty()),
            Event::CursorMoved { x: 16.0, y: 4.0 },
        ],
        vec![press(Mods::CONTROL), Event::CursorMoved { x: 16.0, y: 0.0 }],
    ];
    let mut core = Core::new(ScriptedSurface::new(script), registry, &config("Cam"));
    core.start().unwrap();

    core.run_frame().unwrap();
    let dolly = core.context().camera().unwrap().borrow().dolly();
    assert!((dolly - 2.5).abs() < 1e-5, "dolly {}", dolly);

    core.run_frame().unwrap();
    let dolly = core.context().camera().unwrap().borrow().dolly();
    assert!((dolly - 2.5).abs() < 1e-5, "ctrl drag moved the camera to {}", dolly);
}

#[test]
fn close_request_quits_before_rendering() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let script = vec![vec![Event::CloseRequested]];
    let mut core = Core::new(ScriptedSurface::new(script), registry, &config("A"));
    core.start().unwrap();
    assert_eq!(core.run_frame().unwrap(), Frame::Quit);
    assert!(entries(&log).iter().all(|e| !e.contains("render")));
    assert_eq!(core.surface().swaps, 0);
}

#[test]
fn ctrl_tab_cycles_plugins_without_reaching_them() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);
    recorder(&mut registry, "B", 2, &log);

    let script = vec![
        vec![],
        vec![key(Key::Tab, Mods::CONTROL)],
        vec![key(Key::Tab, Mods::CONTROL)],
        vec![key(Key::Tab, Mods::empty())],
    ];
    let mut core = Core::new(ScriptedSurface::new(script), registry, &config("A"));
    core.start().unwrap();

    core.run_frame().unwrap();
    assert_eq!(core.active_plugin(), Some("A"));
    core.run_frame().unwrap();
    assert_eq!(core.active_plugin(), Some("B"));
    core.run_frame().unwrap();
    assert_eq!(core.active_plugin(), Some("A"));
    core.run_frame().unwrap();

    let log = entries(&log);
    let keys: Vec<_> = log.iter().filter(|e| e.contains("key")).collect();
    assert_eq!(keys, ["A key Tab"]);
    let b_create = log.iter().position(|e| e.starts_with("B create")).unwrap();
    let a_drop = log.iter().position(|e| e == "A drop").unwrap();
    assert!(a_drop < b_create);
    assert_eq!(log[b_create + 2], "B render 1");

    let titles = &core.surface().titles;
    assert_eq!(titles.first().map(String::as_str), Some("OGL4Core2 - A [1/2]"));
    assert!(titles.iter().any(|t| t == "OGL4Core2 - B [2/2]"));
}

#[test]
fn minimized_window_skips_the_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let config = Config {
        screenshot: vec![0],
        filename: dir.path().join("shot"),
        quit: true,
        ..config("A")
    };
    let surface = ScriptedSurface { size: Some((WIDTH, 0)), ..Default::default() };
    let mut core = Core::new(surface, registry, &config);
    core.run().unwrap();

    assert!(entries(&log).contains(&"A render 0".to_owned()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(core.surface().swaps, 1);
}

#[test]
fn egui_panel_hosts_the_active_plugin() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);
    recorder(&mut registry, "B", 2, &log);

    let script = vec![vec![], vec![key(Key::Tab, Mods::CONTROL)], vec![key(Key::W, Mods::empty())]];
    let mut core = Core::new(ScriptedSurface::new(script), registry, &config("A")).with_overlay(EguiOverlay::headless());
    core.start().unwrap();
    for _ in 0..3 {
        core.run_frame().unwrap();
    }

    let log = entries(&log);
    let at = |entry: &str| log.iter().position(|e| e == entry).unwrap();
    assert!(at("A render 0") < at("A gui 0"));
    assert!(at("A gui 0") < at("A drop"));
    assert!(at("B render 1") < at("B gui 1"));
    assert!(log.contains(&"B key W".to_owned()));
    assert!(log.contains(&"B gui 2".to_owned()));
    assert_eq!(core.surface().titles.first().map(String::as_str), Some("OGL4Core2 - A [1/2]"));
}

#[test]
fn title_overlay_leaves_plugin_panels_alone() {
    let log = Log::default();
    let mut registry = PluginRegistry::new();
    recorder(&mut registry, "A", 1, &log);

    let mut core = Core::new(ScriptedSurface::default(), registry, &config("A"));
    core.start().unwrap();
    core.run_frame().unwrap();
    assert!(entries(&log).iter().all(|e| !e.contains("gui")));
}
