//! liu-probe - 裸流逐帧探测工具
//!
//! 用对应格式的定界器走完整条流, 报告每个单元的大小与流级信息.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::process;

use liu_core::{BitstreamBuffer, LiuError, LiuResult};
use liu_format::{
    FrameReader, H264SliceReader, IvfFrameReader, JpegFrameReader, PicStruct,
    mjpeg::parse_pic_struct,
};

/// Liu 裸流逐帧探测工具
#[derive(Parser, Debug)]
#[command(name = "liu-probe", version, about = "纯 Rust 裸流逐帧探测工具")]
struct Cli {
    /// 输入文件路径
    input: String,

    /// 裸流格式
    #[arg(long, short, value_enum)]
    format: StreamFormat,

    /// 显示每个单元的信息 (逐帧一行)
    #[arg(long)]
    show_frames: bool,

    /// H.264: 严格起始码判定 (检查 forbidden_zero_bit)
    #[arg(long)]
    strict: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (不初始化日志输出)
    #[arg(short, long)]
    quiet: bool,
}

/// 支持的裸流格式
#[derive(ValueEnum, Clone, Copy, Debug)]
enum StreamFormat {
    /// H.264 Annex-B 裸流
    H264,
    /// Motion-JPEG 流
    Mjpeg,
    /// IVF 封装流
    Ivf,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    format: String,
    input: String,
    nb_frames: u64,
    total_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<ContainerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pic_struct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<FrameInfo>>,
}

/// IVF 容器头信息
#[derive(Serialize)]
struct ContainerInfo {
    codec: String,
    width: u16,
    height: u16,
    frame_rate: String,
    declared_frames: u32,
}

/// 单元信息
#[derive(Serialize)]
struct FrameInfo {
    index: u64,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_stamp: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    if let Err(e) = run(&cli) {
        eprintln!("liu-probe: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> LiuResult<()> {
    let mut container = None;
    let mut reader: Box<dyn FrameReader> = match cli.format {
        StreamFormat::H264 => {
            Box::new(H264SliceReader::open(&cli.input)?.with_strict(cli.strict))
        }
        StreamFormat::Mjpeg => Box::new(JpegFrameReader::open(&cli.input)?),
        StreamFormat::Ivf => {
            let reader = IvfFrameReader::open(&cli.input)?;
            let h = reader.header();
            container = Some(ContainerInfo {
                codec: h.codec.to_string(),
                width: h.width,
                height: h.height,
                frame_rate: h.rate().to_string(),
                declared_frames: h.num_frames,
            });
            Box::new(reader)
        }
    };

    let mut frames = Vec::new();
    let mut nb_frames = 0u64;
    let mut total_bytes = 0u64;
    let mut pic_struct = None;

    let mut bs = BitstreamBuffer::new();
    loop {
        match reader.read_next_frame(&mut bs) {
            Ok(()) => {
                // MJPEG: 从首幅图片恢复图片结构提示
                if nb_frames == 0 && matches!(cli.format, StreamFormat::Mjpeg) {
                    pic_struct = Some(describe_pic_struct(parse_pic_struct(bs.data())));
                }
                let carries_ts = matches!(cli.format, StreamFormat::Ivf);
                frames.push(FrameInfo {
                    index: nb_frames,
                    size: bs.len(),
                    time_stamp: carries_ts.then(|| bs.time_stamp()),
                });
                nb_frames += 1;
                total_bytes += bs.len() as u64;
                bs.consume(bs.len());
            }
            Err(LiuError::Eof) => break,
            Err(e) => {
                reader.close();
                return Err(e);
            }
        }
    }
    reader.close();

    let output = ProbeOutput {
        format: format!("{:?}", cli.format).to_lowercase(),
        input: cli.input.clone(),
        nb_frames,
        total_bytes,
        container,
        pic_struct,
        frames: cli.show_frames.then_some(frames),
    };

    if cli.json {
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => return Err(LiuError::InvalidArgument(format!("JSON 序列化失败: {e}"))),
        }
    } else {
        print_text(&output);
    }
    Ok(())
}

fn describe_pic_struct(ps: PicStruct) -> String {
    match ps {
        PicStruct::Unknown => "unknown",
        PicStruct::Progressive => "progressive",
        PicStruct::FieldTff => "tff",
        PicStruct::FieldBff => "bff",
    }
    .to_string()
}

fn print_text(output: &ProbeOutput) {
    println!("输入: {} ({})", output.input, output.format);
    if let Some(c) = &output.container {
        println!(
            "容器: codec={} {}x{} rate={} 声明帧数={}",
            c.codec, c.width, c.height, c.frame_rate, c.declared_frames
        );
    }
    if let Some(ps) = &output.pic_struct {
        println!("图片结构: {ps}");
    }
    if let Some(frames) = &output.frames {
        for f in frames {
            match f.time_stamp {
                Some(ts) => println!("  帧 {:>5}: {:>8} 字节 ts={}", f.index, f.size, ts),
                None => println!("  帧 {:>5}: {:>8} 字节", f.index, f.size),
            }
        }
    }
    println!("共 {} 帧, {} 字节", output.nb_frames, output.total_bytes);
}
