// ==========================================
// 集装箱排载工具 - 优化服务 HTTP 实现
// ==========================================
// 职责: reqwest 客户端 + 分操作超时 + 错误报文解码
// 端点: /api/upload /api/columns /api/process /api/generate_packing_list
// ==========================================

use crate::config::ConfigManager;
use crate::domain::loading::Container;
use crate::domain::types::{FileKind, OperationKind};
use crate::domain::upload::UploadedFile;
use crate::optimizer::error::{OptimizerError, OptimizerResult};
use crate::optimizer::optimizer_service_trait::OptimizerService;
use crate::optimizer::wire::{
    ColumnsRequest, ColumnsResponse, ExportRequest, ProcessRequest, ProcessResponse,
    UploadResponse,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

// ==========================================
// OperationTimeouts - 分操作等待上限
// ==========================================
#[derive(Debug, Clone)]
pub struct OperationTimeouts {
    pub upload: Duration,  // 上传: 默认 300s
    pub schema: Duration,  // 列名发现: 默认 120s
    pub process: Duration, // 排载计算: 默认 300s
    pub export: Duration,  // 导出: 默认 300s
}

impl OperationTimeouts {
    /// 从配置管理器读取各操作超时
    pub fn from_config(config: &ConfigManager) -> Self {
        Self {
            upload: config.get_upload_timeout(),
            schema: config.get_schema_timeout(),
            process: config.get_process_timeout(),
            export: config.get_export_timeout(),
        }
    }

    fn for_operation(&self, operation: OperationKind) -> Duration {
        match operation {
            OperationKind::Upload => self.upload,
            OperationKind::FetchColumns => self.schema,
            OperationKind::Process => self.process,
            OperationKind::Export => self.export,
        }
    }
}

// ==========================================
// HttpOptimizerService - HTTP 客户端
// ==========================================
pub struct HttpOptimizerService {
    client: reqwest::Client,
    base_url: String,
    timeouts: OperationTimeouts,
}

impl HttpOptimizerService {
    /// 按注入配置构造客户端
    pub fn new(config: &ConfigManager) -> OptimizerResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| OptimizerError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.get_base_url(),
            timeouts: OperationTimeouts::from_config(config),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 将 reqwest 错误归类为超时或传输失败
    fn classify_send_error(
        operation: OperationKind,
        timeout: Duration,
        err: reqwest::Error,
    ) -> OptimizerError {
        if err.is_timeout() {
            OptimizerError::Timeout {
                operation,
                timeout_secs: timeout.as_secs(),
            }
        } else if err.is_connect() {
            OptimizerError::Transport {
                operation,
                message: format!("无法建立连接: {}", err),
            }
        } else {
            OptimizerError::Transport {
                operation,
                message: err.to_string(),
            }
        }
    }

    /// 解码错误报文: 二进制 → 文本 → JSON {error}
    ///
    /// 任一步失败则退化为带状态码的通用失败(Decode)
    pub fn decode_error_payload(status: u16, body: &[u8]) -> OptimizerError {
        let text = match std::str::from_utf8(body) {
            Ok(t) => t,
            Err(_) => return OptimizerError::Decode { status },
        };
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => match value.get("error").and_then(|e| e.as_str()) {
                Some(message) => OptimizerError::Server {
                    status,
                    message: message.to_string(),
                },
                None => OptimizerError::Decode { status },
            },
            Err(_) => OptimizerError::Decode { status },
        }
    }

    /// JSON 端点的统一请求路径
    async fn post_json<Req, Resp>(
        &self,
        operation: OperationKind,
        path: &str,
        payload: &Req,
    ) -> OptimizerResult<(u16, Resp)>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let timeout = self.timeouts.for_operation(operation);
        let url = self.endpoint(path);
        let request_id = Uuid::new_v4();
        tracing::info!(request_id = %request_id, operation = %operation, url = %url, "发起请求");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(operation, timeout, e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(Self::decode_error_payload(status, &body));
        }

        let parsed = response.json::<Resp>().await.map_err(|e| {
            OptimizerError::SchemaMismatch {
                operation,
                message: e.to_string(),
            }
        })?;
        Ok((status, parsed))
    }
}

#[async_trait]
impl OptimizerService for HttpOptimizerService {
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> OptimizerResult<UploadedFile> {
        let operation = OperationKind::Upload;
        let timeout = self.timeouts.upload;
        let url = self.endpoint("/api/upload");
        let request_id = Uuid::new_v4();
        tracing::info!(
            request_id = %request_id,
            operation = %operation,
            file_name = %file_name,
            size_bytes = bytes.len(),
            "发起上传"
        );

        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(operation, timeout, e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(Self::decode_error_payload(status, &body));
        }

        let parsed: UploadResponse =
            response
                .json()
                .await
                .map_err(|e| OptimizerError::SchemaMismatch {
                    operation,
                    message: e.to_string(),
                })?;

        // 2xx 响应也可能携带结构化错误
        if let Some(message) = parsed.error {
            return Err(OptimizerError::Server { status, message });
        }

        let file_path = parsed
            .filepath
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| OptimizerError::SchemaMismatch {
                operation,
                message: "上传响应缺少 filepath".to_string(),
            })?;
        let sheets = parsed
            .sheets
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OptimizerError::SchemaMismatch {
                operation,
                message: "上传响应缺少 sheet 列表".to_string(),
            })?;

        // 文件类型: 服务端标识优先,否则按后缀判定
        let file_kind = parsed
            .file_kind
            .as_deref()
            .and_then(FileKind::from_wire_str)
            .or_else(|| FileKind::from_file_name(file_name))
            .ok_or_else(|| OptimizerError::SchemaMismatch {
                operation,
                message: format!("无法判定文件类型: {}", file_name),
            })?;

        Ok(UploadedFile {
            file_path,
            sheets,
            file_kind,
            uploaded_at: Utc::now(),
        })
    }

    async fn fetch_columns(
        &self,
        file_path: &str,
        sheet_name: &str,
        header_row: u32,
    ) -> OptimizerResult<Vec<String>> {
        let operation = OperationKind::FetchColumns;
        let payload = ColumnsRequest {
            filepath: file_path.to_string(),
            sheet_name: sheet_name.to_string(),
            header_row,
        };

        let (status, parsed): (u16, ColumnsResponse) =
            self.post_json(operation, "/api/columns", &payload).await?;

        if let Some(message) = parsed.error {
            return Err(OptimizerError::Server { status, message });
        }

        parsed.columns.ok_or_else(|| OptimizerError::SchemaMismatch {
            operation,
            message: "列名响应缺少 columns".to_string(),
        })
    }

    async fn process(&self, request: ProcessRequest) -> OptimizerResult<Vec<Container>> {
        let operation = OperationKind::Process;
        let (status, parsed): (u16, ProcessResponse) =
            self.post_json(operation, "/api/process", &request).await?;

        if let Some(message) = parsed.error {
            return Err(OptimizerError::Server { status, message });
        }

        parsed.results.ok_or_else(|| OptimizerError::SchemaMismatch {
            operation,
            message: "排载响应缺少 results".to_string(),
        })
    }

    async fn generate_packing_list(&self, request: ExportRequest<'_>) -> OptimizerResult<Vec<u8>> {
        let operation = OperationKind::Export;
        let timeout = self.timeouts.export;
        let url = self.endpoint("/api/generate_packing_list");
        let request_id = Uuid::new_v4();
        tracing::info!(request_id = %request_id, operation = %operation, url = %url, "发起导出");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(operation, timeout, e))?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify_send_error(operation, timeout, e))?;

        // 二进制通道: 失败响应的报文也按二进制到达
        if !success {
            return Err(Self::decode_error_payload(status, &body));
        }
        if body.is_empty() {
            return Err(OptimizerError::EmptyArtifact { status });
        }

        Ok(body.to_vec())
    }
}
