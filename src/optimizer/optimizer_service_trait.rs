// ==========================================
// 集装箱排载工具 - 优化服务 Trait
// ==========================================
// 职责: 定义外部优化服务接口(不包含实现)
// 实现者: HttpOptimizerService;测试中由 Mock 实现
// ==========================================

use crate::domain::loading::Container;
use crate::domain::upload::UploadedFile;
use crate::optimizer::error::OptimizerResult;
use crate::optimizer::wire::{ExportRequest, ProcessRequest};
use async_trait::async_trait;

// ==========================================
// OptimizerService Trait
// ==========================================
// 用途: 工作流控制器与网络实现之间的接缝;
// 控制器只依赖本接口,可在无网络环境下测试
#[async_trait]
pub trait OptimizerService: Send + Sync {
    /// 上传工作簿
    ///
    /// # 参数
    /// - file_name: 原始文件名(用于类型判定与服务端落盘命名)
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(UploadedFile): 服务端路径 + sheet 列表 + 文件类型
    /// - Err(OptimizerError): 传输/超时/服务端错误
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> OptimizerResult<UploadedFile>;

    /// 列名发现
    ///
    /// # 参数
    /// - file_path: 上传时获得的服务端文件路径
    /// - sheet_name: 目标 sheet
    /// - header_row: 表头行下标(0 起)
    ///
    /// # 返回
    /// - Ok(Vec<String>): 可映射列名(保序)
    /// - Err(OptimizerError): sheet/表头组合非法时为服务端错误
    async fn fetch_columns(
        &self,
        file_path: &str,
        sheet_name: &str,
        header_row: u32,
    ) -> OptimizerResult<Vec<String>>;

    /// 排载计算
    ///
    /// # 返回
    /// - Ok(Vec<Container>): 规范形态的集装箱列表(模型边界校验由调用方执行)
    async fn process(&self, request: ProcessRequest) -> OptimizerResult<Vec<Container>>;

    /// 生成装箱单(二进制响应通道)
    ///
    /// # 返回
    /// - Ok(Vec<u8>): 非空的二进制工作簿
    /// - Err(OptimizerError): 错误报文同样到达二进制通道,
    ///   须按 文本 → JSON 解码;解码失败按 Decode 归类
    async fn generate_packing_list(&self, request: ExportRequest<'_>) -> OptimizerResult<Vec<u8>>;
}
