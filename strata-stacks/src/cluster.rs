//! Cluster stack
//!
//! An EKS cluster in its own VPC, running the AWS Load Balancer Controller
//! with an IAM role bound to its service account through the cluster's OIDC
//! provider.

use log::info;
use strata_core::assert_defined;
use strata_core::error::DefinitionResult;
use strata_core::registry::{Registry, ResourceOptions};
use strata_core::resource::Value;
use strata_provider_aws::eks::{ClusterSpec, EksCluster, NodeGroupSpec};
use strata_provider_aws::iam::{Policy, PolicyAttachment, PolicyDocument, Role, ServiceAccountIdentity};
use strata_provider_aws::network::{NetworkSpec, Vpc};
use strata_provider_kubernetes::{
    Chart, ChartSpec, Namespace, ObjectMeta, ProviderBinding, ServiceAccount, remove_crd_status,
};

use crate::config::StackConfig;

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const CONTROLLER_NAMESPACE: &str = "aws-lb-controller";
pub const CONTROLLER_SERVICE_ACCOUNT: &str = "aws-lb-controller-serviceaccount";
pub const CONTROLLER_CHART: &str = "aws-load-balancer-controller";
pub const CONTROLLER_CHART_REPO: &str = "https://aws.github.io/eks-charts";
pub const ROLE_NAME: &str = "aws-loadbalancer-controller-role";
pub const POLICY_NAME: &str = "aws-loadbalancer-controller-policy";
pub const ATTACHMENT_NAME: &str = "aws-loadbalancer-controller-attachment";

/// Everything the cluster stack registered
#[derive(Debug, Clone)]
pub struct ClusterStack {
    pub vpc: Vpc,
    pub cluster: EksCluster,
    pub role: Role,
    pub policy: Policy,
    pub attachment: PolicyAttachment,
    pub provider: ProviderBinding,
    pub namespace: Namespace,
    pub service_account: ServiceAccount,
    pub chart: Chart,
}

/// Identity the controller's pods authenticate as
pub fn controller_identity() -> ServiceAccountIdentity {
    ServiceAccountIdentity::new(CONTROLLER_NAMESPACE, CONTROLLER_SERVICE_ACCOUNT)
}

pub fn define(registry: &mut dyn Registry, config: &StackConfig) -> DefinitionResult<ClusterStack> {
    let region = config.region()?;
    let demo_name = config.demo_name.as_str();
    info!("defining cluster stack {} in {}", demo_name, region);

    // Network
    let vpc = Vpc::new(
        registry,
        demo_name,
        &NetworkSpec::new(VPC_CIDR).with_tag("Name", config.project.as_str()),
    )?;

    // Kubernetes cluster
    let cluster = EksCluster::new(
        registry,
        demo_name,
        &ClusterSpec {
            vpc_id: vpc.vpc_id.clone(),
            public_subnet_ids: vpc.public_subnet_ids.clone(),
            node_group: NodeGroupSpec::new(2, 1, 3, "t2.small")?,
            create_oidc_provider: true,
        },
    )?;

    // IAM role for the controller's service account
    let oidc_provider = assert_defined("cluster.oidc_provider", cluster.oidc_provider.as_ref())?;
    let role = Role::for_service_account(registry, ROLE_NAME, oidc_provider, controller_identity())?;
    let document = PolicyDocument::load(&config.policy_file)?;
    let policy = Policy::new(registry, POLICY_NAME, &document, &role)?;
    let attachment = PolicyAttachment::new(registry, ATTACHMENT_NAME, &policy, &role)?;

    // AWS Load Balancer Controller
    let provider = ProviderBinding::new(registry, "provider", cluster.kubeconfig.clone())?;

    let namespace = Namespace::new(
        registry,
        &format!("{}-ns", CONTROLLER_NAMESPACE),
        &ObjectMeta::named(CONTROLLER_NAMESPACE)?
            .with_label("app.kubernetes.io/name", CONTROLLER_CHART),
        ResourceOptions::new()
            .with_provider(&provider.resource)
            .with_parent(&provider.resource),
    )?;

    let service_account = ServiceAccount::new(
        registry,
        "aws-lb-controller-sa",
        ObjectMeta::named(CONTROLLER_SERVICE_ACCOUNT)?.in_namespace(namespace.name.clone()),
        role.arn.clone(),
        ResourceOptions::new().with_provider(&provider.resource),
    )?;

    let values = Value::map([
        ("region", Value::from(region)),
        (
            "serviceAccount",
            Value::map([
                ("name", Value::from(service_account.name.clone())),
                ("create", Value::from(false)),
            ]),
        ),
        ("vpcId", Value::from(vpc.vpc_id.clone())),
        ("clusterName", Value::from(cluster.name.clone())),
        (
            "podLabels",
            Value::map([
                ("stack", Value::from(config.stack.as_str())),
                ("app", Value::from("aws-lb-controller")),
            ]),
        ),
    ]);
    let chart = Chart::new(
        registry,
        "lb",
        &ChartSpec::new(CONTROLLER_CHART, namespace.name.clone())
            .from_repo(CONTROLLER_CHART_REPO)
            .with_values(values),
        ResourceOptions::new()
            .with_transformation(remove_crd_status())
            .with_provider(&provider.resource)
            .with_parent(&namespace.resource),
    )?;

    registry.export("kubeconfig", cluster.kubeconfig.clone().secret())?;

    Ok(ClusterStack {
        vpc,
        cluster,
        role,
        policy,
        attachment,
        provider,
        namespace,
        service_account,
        chart,
    })
}
