//! Integration tests for the VmRuntime gRPC Server
//!
//! Tests cover:
//! - Create followed by Execute over a real channel
//! - Verbatim NotFound message for unknown project ids
//! - Status codes for empty and corrupt content
//! - Overwrite semantics and concurrent executes

mod common;

#[cfg(feature = "grpc-server")]
mod grpc_tests {
    use super::common::{dispatcher, expected_result, MockEngineFactory};
    use provevm_runtime::grpc_server::proto::vm_runtime_client::VmRuntimeClient;
    use provevm_runtime::grpc_server::proto::*;
    use provevm_runtime::{pack_image, ExecutionDispatcher, VmRuntimeService};
    use std::sync::Arc;
    use tokio::time::Duration;
    use tonic::transport::{Channel, Server};

    async fn start_test_server(dispatcher: Arc<ExecutionDispatcher>) -> String {
        let addr: std::net::SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let local_addr = listener.local_addr().unwrap();
        let server_url = format!("http://{}", local_addr);

        let vm_runtime_server = VmRuntimeService::new(dispatcher).into_server();

        tokio::spawn(async move {
            Server::builder()
                .add_service(vm_runtime_server)
                .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
                .await
                .unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        server_url
    }

    async fn connect(factory: MockEngineFactory) -> VmRuntimeClient<Channel> {
        let server_url = start_test_server(dispatcher(factory)).await;
        VmRuntimeClient::connect(server_url)
            .await
            .expect("Failed to connect to server")
    }

    fn create_request(project_id: u64, image: &[u8]) -> CreateRequest {
        CreateRequest {
            project_id,
            content: pack_image(image).unwrap(),
            exp_params: vec![String::new()],
        }
    }

    fn execute_request(project_id: u64, datas: &[&str]) -> ExecuteRequest {
        ExecuteRequest {
            project_id,
            task_id: Some(0),
            client_id: Some("clientID".to_string()),
            sequencer_signature: Some("sequencerSignature".to_string()),
            datas: datas.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_execute() {
        let mut client = connect(MockEngineFactory::default()).await;
        let datas = [r#"{"private_a": 3, "private_b": 5}"#];

        client
            .create(tonic::Request::new(create_request(10001, b"program-A")))
            .await
            .unwrap();

        let response = client
            .execute(tonic::Request::new(execute_request(10001, &datas)))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.result.is_empty());
        assert_eq!(response.result, expected_result("program-A", &datas));
    }

    #[tokio::test]
    async fn test_project_not_found() {
        let mut client = connect(MockEngineFactory::default()).await;

        let err = client
            .execute(tonic::Request::new(execute_request(99999, &["{}"])))
            .await
            .unwrap_err();

        assert_eq!(err.code(), tonic::Code::NotFound);
        assert!(err
            .message()
            .contains("projectID '99999' does not exist in the halo2 vm."));
    }

    #[tokio::test]
    async fn test_single_use_content() {
        let mut client = connect(MockEngineFactory::default()).await;

        client
            .create(tonic::Request::new(create_request(3, b"program-once")))
            .await
            .unwrap();
        client
            .execute(tonic::Request::new(execute_request(3, &[])))
            .await
            .unwrap();

        let err = client
            .execute(tonic::Request::new(execute_request(3, &[])))
            .await
            .unwrap_err();
        assert_eq!(err.code(), tonic::Code::NotFound);
    }

    #[tokio::test]
    async fn test_empty_content_rejected() {
        let mut client = connect(MockEngineFactory::default()).await;

        let err = client
            .create(tonic::Request::new(CreateRequest {
                project_id: 4,
                content: String::new(),
                exp_params: vec![],
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_corrupt_content_is_data_loss() {
        let factory = MockEngineFactory::default();
        let mut client = connect(factory.clone()).await;

        client
            .create(tonic::Request::new(CreateRequest {
                project_id: 5,
                content: "0badc0de0badc0de".to_string(),
                exp_params: vec![],
            }))
            .await
            .unwrap();

        let err = client
            .execute(tonic::Request::new(execute_request(5, &["{}"])))
            .await
            .unwrap_err();
        assert_eq!(err.code(), tonic::Code::DataLoss);
        assert_eq!(factory.created(), 0);
    }

    #[tokio::test]
    async fn test_overwrite_changes_result() {
        let mut client = connect(MockEngineFactory::default()).await;

        client
            .create(tonic::Request::new(create_request(1, b"program-A")))
            .await
            .unwrap();
        let r1 = client
            .execute(tonic::Request::new(execute_request(1, &[r#"{"x":1}"#])))
            .await
            .unwrap()
            .into_inner()
            .result;

        client
            .create(tonic::Request::new(create_request(1, b"program-B")))
            .await
            .unwrap();
        let r2 = client
            .execute(tonic::Request::new(execute_request(1, &[r#"{"x":2}"#])))
            .await
            .unwrap()
            .into_inner()
            .result;

        assert_ne!(r1, r2);
        assert_eq!(r2, expected_result("program-B", &[r#"{"x":2}"#]));
    }

    #[tokio::test]
    async fn test_concurrent_executes_on_distinct_projects() {
        let client = connect(MockEngineFactory::with_delay(Duration::from_millis(50))).await;

        let mut setup = client.clone();
        setup
            .create(tonic::Request::new(create_request(11, b"program-11")))
            .await
            .unwrap();
        setup
            .create(tonic::Request::new(create_request(22, b"program-22")))
            .await
            .unwrap();

        let mut first = client.clone();
        let mut second = client.clone();
        let (a, b) = tokio::join!(
            first.execute(tonic::Request::new(execute_request(11, &["a"]))),
            second.execute(tonic::Request::new(execute_request(22, &["b"]))),
        );

        assert_eq!(
            a.unwrap().into_inner().result,
            expected_result("program-11", &["a"])
        );
        assert_eq!(
            b.unwrap().into_inner().result,
            expected_result("program-22", &["b"])
        );
    }
}
