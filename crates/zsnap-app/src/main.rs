//! ZSNAP 演示程序
//!
//! 在无界面视图上用脚本事件驱动几次取点交互，并打印结果。
//! 可选参数为 JSON 格式的捕捉配置文件。

use anyhow::{Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use zsnap_core::geometry::{CircleCurve, Curve, LineCurve};
use zsnap_core::headless::OrthoView;
use zsnap_core::math::{Point3, Vector3};
use zsnap_core::shape::{DetectedShape, ShapeId};
use zsnap_core::snap::SnapConfig;
use zsnap_ui::{
    AngleResolver, HeadlessHost, Key, LengthAtAxisResolver, PointSnapData, PointerEvent, SnapEventHandler,
    SnapOutcome, SnapRequest,
};

fn load_config() -> Result<SnapConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read config: {path}"))?;
            SnapConfig::from_json(&json).with_context(|| format!("Invalid config: {path}"))
        }
        None => Ok(SnapConfig::default()),
    }
}

fn demo_view() -> Result<OrthoView> {
    let mut view = OrthoView::new();
    view.add_shape(DetectedShape::edge(
        ShapeId(1),
        Curve::Line(LineCurve::new(Point3::origin(), Point3::new(100.0, 0.0, 0.0))),
    ));
    view.add_shape(DetectedShape::edge(
        ShapeId(2),
        Curve::Line(LineCurve::new(Point3::new(50.0, -50.0, 0.0), Point3::new(50.0, 50.0, 0.0))),
    ));
    view.add_shape(DetectedShape::edge(
        ShapeId(3),
        Curve::Circle(CircleCurve::new(Point3::new(150.0, 0.0, 0.0), Vector3::z(), 20.0)?),
    ));
    Ok(view)
}

async fn report(name: &str, outcome: SnapOutcome) {
    match outcome.await {
        Ok(Ok(Some(snaped))) => info!(
            name,
            point = ?snaped.point,
            label = snaped.label().unwrap_or("-"),
            "picked"
        ),
        Ok(Ok(None)) => info!(name, "completed without a point"),
        Ok(Err(cancelled)) => info!(name, "{cancelled}"),
        Err(_) => warn!(name, "handler dropped before completing"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(Level::DEBUG).finish())?;

    let config = load_config()?;
    let view = demo_view()?;
    info!(shapes = view.shapes().len(), "Starting ZSNAP demo...");

    // 移到两条线段的交点附近后点击
    let (mut handler, outcome) = SnapEventHandler::point(HeadlessHost::new(), PointSnapData::new(), config.clone());
    for (x, y) in [(20.0, 30.0), (48.0, 2.0), (50.5, 0.5)] {
        handler.on_pointer_move(&view, &PointerEvent::mouse(x, y));
        if let Some(tip) = &handler.host().float_tip {
            info!(x, y, tip = tip.as_str(), "hover");
        }
    }
    handler.on_pointer_down(&view, &PointerEvent::mouse(50.5, 0.5));
    report("intersection", outcome).await;

    // 相对上一点的字面输入
    let data = PointSnapData::new().with_ref_point(Point3::new(50.0, 0.0, 0.0));
    let (mut handler, outcome) = SnapEventHandler::point(HeadlessHost::new(), data, config.clone());
    handler.on_pointer_move(&view, &PointerEvent::mouse(80.0, 40.0));
    handler.on_key_down(Key::Char('3'));
    if let Err(error) = handler.submit_input(&view, "30,40") {
        warn!(error = error.key(), "input rejected");
    }
    report("relative", outcome).await;

    // 沿 X 轴的长度，指针在起点后方
    let (mut handler, outcome) = SnapEventHandler::length_at_axis(
        HeadlessHost::new(),
        LengthAtAxisResolver::new(Point3::new(100.0, 0.0, 0.0), Vector3::x())?,
        SnapRequest::new(),
        config.clone(),
    );
    handler.on_pointer_move(&view, &PointerEvent::mouse(90.0, 10.0));
    handler.on_key_down(Key::Char('2'));
    handler.submit_input(&view, "25")?;
    report("length", outcome).await;

    // 角度交互中途取消
    let (mut handler, outcome) = SnapEventHandler::angle(
        HeadlessHost::new(),
        AngleResolver::new(Point3::new(150.0, 0.0, 0.0), Point3::new(170.0, 0.0, 0.0), Vector3::z())?,
        None,
        SnapRequest::new(),
        config,
    );
    handler.on_pointer_move(&view, &PointerEvent::mouse(150.0, 60.0));
    if let Some(tip) = &handler.host().float_tip {
        info!(tip = tip.as_str(), "angle");
    }
    handler.on_key_down(Key::Escape);
    report("angle", outcome).await;

    Ok(())
}
