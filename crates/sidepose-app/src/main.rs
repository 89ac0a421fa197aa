//! # sidepose-app
//!
//! SIDEPOSE 바이너리 진입점.
//! 설정 로드, 프레임 소스/검출기/주석기 와이어링, 웹 서버 라이프사이클.

mod lifecycle;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sidepose_core::config::{AppConfig, DetectorBackend, SourceKind};
use sidepose_core::config_manager::ConfigManager;
use sidepose_core::models::side_selection::SideSelection;
use sidepose_vision::capture::SourceFactory;
use sidepose_vision::detector::create_detector;
use sidepose_vision::processor::FrameAnnotator;
use sidepose_web::{AppState, WebServer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;

/// SIDEPOSE — 웹캠 포즈 측면 주석 스트리머
///
/// 카메라 프레임에 선택한 신체 측면의 랜드마크를 그려 WebSocket으로 전송합니다.
#[derive(Parser, Debug, Default)]
#[command(name = "sidepose")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 웹 서버 포트
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 외부 접근 허용 (0.0.0.0 바인드)
    #[arg(long)]
    allow_external: bool,

    /// 카메라 장치 번호
    #[arg(long)]
    camera: Option<i32>,

    /// 카메라 대신 정지 이미지(파일 또는 디렉토리) 반복 재생
    #[arg(long, conflicts_with = "camera")]
    image: Option<PathBuf>,

    /// ONNX 포즈 랜드마크 모델 경로 (지정 시 onnx 백엔드 사용)
    #[arg(long, short = 'm')]
    model: Option<PathBuf>,

    /// 시작 측면 (left, right)
    #[arg(long, short = 's')]
    side: Option<String>,

    /// 좌우 반전 끄기
    #[arg(long)]
    no_mirror: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// CLI 인자를 설정에 덮어쓰기 (파일에는 저장하지 않음)
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if args.allow_external {
        config.web.allow_external = true;
    }
    if let Some(index) = args.camera {
        config.camera.source = SourceKind::Device;
        config.camera.device_index = index;
    }
    if let Some(path) = &args.image {
        config.camera.source = SourceKind::Image;
        config.camera.image_path = Some(path.clone());
    }
    if let Some(model) = &args.model {
        config.detector.backend = DetectorBackend::Onnx;
        config.detector.model_path = Some(model.clone());
    }
    if let Some(side) = &args.side {
        config.stream.initial_side = side.clone();
    }
    if args.no_mirror {
        config.camera.mirror = false;
    }
}

/// 설정 로드 — 명시 경로 → 플랫폼 기본 경로 → 기본값
fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    if let Some(path) = path {
        let manager = ConfigManager::with_path(path.clone())
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?;
        info!("설정 파일: {}", manager.config_path().display());
        return Ok(manager.get());
    }

    match ConfigManager::new() {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            Ok(manager.get())
        }
        Err(e) => {
            warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
            Ok(AppConfig::default_config())
        }
    }
}

/// 워크스페이스 crate 로그 타겟별 필터 (`RUST_LOG`가 없을 때 사용)
fn log_filter(level: &str) -> String {
    ["sidepose_app", "sidepose_core", "sidepose_vision", "sidepose_web", "tower_http"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn print_banner(config: &AppConfig) {
    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║                                              ║");
    println!("║   SIDEPOSE — 측면 포즈 랜드마크 스트리머     ║");
    println!("║                                              ║");
    println!("╚══════════════════════════════════════════════╝");
    println!("  포트: {}", config.web.port);
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화
    let filter = log_filter(&args.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter)),
        )
        .init();

    let mut config = load_config(args.config.as_ref())?;
    apply_overrides(&mut config, &args);
    config.validate().context("설정 검증 실패")?;

    print_banner(&config);

    // ── 와이어링 ──
    let detector = create_detector(&config.detector).context("포즈 검출기 생성 실패")?;
    let annotator = Arc::new(FrameAnnotator::from_config(detector, &config));
    info!("포즈 검출기: {}", annotator.detector_name());

    let sources = Arc::new(SourceFactory::from_config(&config.camera));
    let side = SideSelection::new(config.stream.initial_side.clone());
    info!("시작 측면: {:?} ({:?})", side.label(), side.side());

    let lifecycle = LifecycleManager::new();
    let state = AppState::new(side, sources, annotator);
    let server = WebServer::new(config.web.clone(), state);
    info!("웹 서버: {}", server.url());

    let shutdown_rx = lifecycle.subscribe();
    let mut server_handle = tokio::spawn(async move { server.run(shutdown_rx).await });

    let result = tokio::select! {
        _ = lifecycle.wait_for_signal() => {
            // 종료 신호 발송 후 graceful shutdown 대기
            (&mut server_handle).await
        }
        // 서버가 먼저 끝난 경우 (바인드 실패 등)
        result = &mut server_handle => result,
    };

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("웹 서버 오류: {e}");
            return Err(e.into());
        }
        Err(e) => {
            error!("웹 서버 태스크 실패: {e}");
            return Err(e.into());
        }
    }

    info!("SIDEPOSE 종료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_all_flags() {
        let args = Args::try_parse_from([
            "sidepose",
            "--port",
            "9000",
            "--allow-external",
            "--image",
            "frames",
            "--model",
            "pose.onnx",
            "--side",
            "left",
            "--no-mirror",
        ])
        .unwrap();

        assert_eq!(args.port, Some(9000));
        assert!(args.allow_external);
        assert_eq!(args.image, Some(PathBuf::from("frames")));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn log_filter_names_crate_targets() {
        let filter = log_filter("debug");
        assert!(filter.starts_with("sidepose_app=debug,"));
        for directive in filter.split(',') {
            let (target, level) = directive.split_once('=').unwrap();
            assert_eq!(level, "debug");
            assert!(target.starts_with("sidepose_") || target == "tower_http", "{target}");
        }
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    fn camera_and_image_conflict() {
        assert!(Args::try_parse_from(["sidepose", "--camera", "1", "--image", "a.png"]).is_err());
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = AppConfig::default_config();
        let args = Args {
            port: Some(9100),
            image: Some(PathBuf::from("still.png")),
            model: Some(PathBuf::from("pose.onnx")),
            side: Some("right".to_string()),
            no_mirror: true,
            ..Args::default()
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.web.port, 9100);
        assert_eq!(config.camera.source, SourceKind::Image);
        assert_eq!(config.camera.image_path, Some(PathBuf::from("still.png")));
        assert_eq!(config.detector.backend, DetectorBackend::Onnx);
        assert_eq!(config.stream.initial_side, "right");
        assert!(!config.camera.mirror);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn no_overrides_keep_defaults() {
        let mut config = AppConfig::default_config();
        apply_overrides(&mut config, &Args::default());
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.camera.source, SourceKind::Device);
        assert!(config.camera.mirror);
    }

    #[test]
    fn explicit_config_path_is_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = load_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.port, 8000);
    }
}
